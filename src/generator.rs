//! Generation engine.
//!
//! Drives one run: split the table into placeholder row and data rows, build a
//! placeholder map per row, substitute into the template, name the result and
//! hand it to the sink. Everything the run needs arrives through
//! `GenerationConfig` and the arguments of `Generator::run`; no process-wide
//! state is consulted.
//!
//! # Row failures
//!
//! Shape and naming problems affect one row only. With `RowErrorPolicy::Skip`
//! the row is recorded in the report and the run continues; with
//! `RowErrorPolicy::Abort` the run stops with that error. Sink failures always
//! stop the run.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{Result, StorygenError};
use crate::naming::NamingRule;
use crate::placeholder::PlaceholderMap;
use crate::rewrite::RuleSet;
use crate::sink::{OutputRecord, OutputSink};
use crate::substitute::Substituter;
use crate::table::{DataRow, Table};
use crate::template::Template;
use crate::types::{Direction, PlaceholderRow, RowErrorPolicy};

/// Everything that shapes a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub placeholder_row: PlaceholderRow,
    pub naming: NamingRule,
    pub direction: Direction,
    pub on_row_error: RowErrorPolicy,
    /// Applied once to the template before any substitution
    pub rules: Option<RuleSet>,
}

impl GenerationConfig {
    /// Placeholder row and naming have no defaults; the rest do.
    pub fn new(placeholder_row: PlaceholderRow, naming: NamingRule) -> Self {
        Self {
            placeholder_row,
            naming,
            direction: Direction::default(),
            on_row_error: RowErrorPolicy::default(),
            rules: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_row_error_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.on_row_error = policy;
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }
}

/// A row that produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub message: String,
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Distinct output names in the order they were first produced
    pub generated: Vec<String>,
    /// Names produced by more than one row; the later row's content was kept
    pub overwritten: Vec<String>,
    pub skipped: Vec<RowFailure>,
    /// Where the sink put the output, if on disk
    pub location: Option<PathBuf>,
}

impl GenerationReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Runs generation for one configuration
#[derive(Debug, Clone)]
pub struct Generator {
    config: GenerationConfig,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate one output per data row of `table` into `sink`.
    ///
    /// # Errors
    ///
    /// - `Table` when the table has no rows at all
    /// - `Naming` when the name column cannot be resolved
    /// - `Pattern` when the rule set does not compile
    /// - the first row error under `RowErrorPolicy::Abort`
    /// - any sink error
    pub fn run(
        &self,
        table: &Table,
        template: &Template,
        sink: &mut dyn OutputSink,
    ) -> Result<GenerationReport> {
        let (placeholders, rows) = table
            .split_placeholder_row(self.config.placeholder_row)
            .ok_or_else(|| StorygenError::table("table has no rows"))?;

        let name_column = self.config.naming.resolve_column(placeholders)?;

        let template = match &self.config.rules {
            Some(rules) if !rules.is_empty() => template.rewritten(rules)?,
            _ => template.clone(),
        };

        // Token-to-value matches the same tokens for every row, so compile once.
        let shared = match self.config.direction {
            Direction::TokenToValue => Some(Substituter::new(placeholders)?),
            Direction::ValueToToken => None,
        };

        info!(
            "Generating {} outputs ({} placeholders, placeholder row {}, direction {})",
            rows.len(),
            placeholders.len(),
            self.config.placeholder_row,
            self.config.direction
        );

        let mut report = GenerationReport::default();
        let mut seen = HashSet::new();
        for row in rows {
            match self.render_row(placeholders, row, name_column, &template, shared.as_ref()) {
                Ok(record) => {
                    debug!("Row {} -> {}", row.index, record.name);
                    if seen.insert(record.name.clone()) {
                        report.generated.push(record.name.clone());
                    } else if !report.overwritten.contains(&record.name) {
                        report.overwritten.push(record.name.clone());
                    }
                    sink.accept(record)?;
                }
                Err(e) if e.is_row_scoped() => match self.config.on_row_error {
                    RowErrorPolicy::Skip => {
                        warn!("Skipping row {}: {}", row.index, e);
                        report.skipped.push(RowFailure {
                            row: row.index,
                            message: e.to_string(),
                        });
                    }
                    RowErrorPolicy::Abort => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }

        report.location = sink.finish()?;
        info!(
            "Generated {} outputs, skipped {} rows",
            report.generated.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn render_row(
        &self,
        placeholders: &[String],
        row: DataRow<'_>,
        name_column: usize,
        template: &Template,
        shared: Option<&Substituter>,
    ) -> Result<OutputRecord> {
        let map = PlaceholderMap::build(row.index, placeholders, row.cells)?;
        let name = self.config.naming.file_name(row.index, row.cells, name_column)?;

        let content = match self.config.direction {
            Direction::TokenToValue => match shared {
                Some(substituter) => substituter.apply(template.as_str(), &map),
                None => Substituter::new(map.tokens())?.apply(template.as_str(), &map),
            },
            Direction::ValueToToken => {
                let reversed = map.reversed();
                Substituter::new(reversed.tokens())?.apply(template.as_str(), &reversed)
            }
        };

        Ok(OutputRecord::new(name, content))
    }
}

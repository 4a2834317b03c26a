//! Job configuration files.
//!
//! A job file stores everything a `generate` run needs, so a run can be
//! repeated without retyping flags. Command-line flags override values loaded
//! from a file, and a preset fills in whatever is still unset.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::GenerationConfig;
use crate::naming::{NameSource, NamingRule};
use crate::rewrite::RuleSet;
use crate::template::Inputs;
use crate::types::{Direction, OutputMode, PlaceholderRow, Preset, RowErrorPolicy};

/// Archive name the story generator has always produced
pub const STORY_ARCHIVE_NAME: &str = "modified_html_templates.zip";

/// Directory the master generator writes its per-row files into
pub const MASTER_OUTPUT_DIR: &str = "master_templates";

/// A generation job that can be saved/loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub preset: Option<Preset>,

    // Inputs
    pub table: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub rules: Option<PathBuf>,

    // Row conventions
    pub placeholder_row: Option<PlaceholderRow>,
    pub name: Option<NameSource>,
    pub name_prefix: Option<String>,
    pub name_suffix: Option<String>,
    pub extension: Option<String>,

    // Output
    pub mode: Option<OutputMode>,
    pub output: Option<PathBuf>,

    pub direction: Direction,
    pub on_row_error: RowErrorPolicy,
}

/// Where and how a validated job writes its results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub mode: OutputMode,
    pub path: PathBuf,
}

impl JobConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize job to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write job to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read job from {:?}", path.as_ref()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse job JSON")?;

        Ok(config)
    }

    /// Fill every still-unset field from `other`.
    pub fn or(self, other: JobConfig) -> Self {
        Self {
            preset: self.preset.or(other.preset),
            table: self.table.or(other.table),
            template: self.template.or(other.template),
            rules: self.rules.or(other.rules),
            placeholder_row: self.placeholder_row.or(other.placeholder_row),
            name: self.name.or(other.name),
            name_prefix: self.name_prefix.or(other.name_prefix),
            name_suffix: self.name_suffix.or(other.name_suffix),
            extension: self.extension.or(other.extension),
            mode: self.mode.or(other.mode),
            output: self.output.or(other.output),
            direction: self.direction,
            on_row_error: self.on_row_error,
        }
    }

    /// Fill unset row conventions and output settings from the preset, if any.
    pub fn with_preset_applied(self) -> Self {
        match self.preset {
            Some(preset) => self.or(preset_defaults(preset)),
            None => self,
        }
    }

    /// Validate the job
    ///
    /// Input files are not checked here: their absence is reported as a notice
    /// by the input gate instead of failing validation.
    pub fn validate(&self) -> Result<()> {
        if self.placeholder_row.is_none() {
            anyhow::bail!("Placeholder row must be set (first or last), directly or via a preset");
        }

        match &self.name {
            None => anyhow::bail!(
                "Name column must be set (column index or header), directly or via a preset"
            ),
            Some(NameSource::Header(header)) if header.trim().is_empty() => {
                anyhow::bail!("Name header cannot be empty")
            }
            Some(_) => {}
        }

        if self.mode.is_none() {
            anyhow::bail!("Output mode must be set (single or archive), directly or via a preset");
        }
        if self.output.is_none() {
            anyhow::bail!("Output path must be set, directly or via a preset");
        }

        if let Some(ext) = &self.extension {
            if ext.contains(['/', '\\']) {
                anyhow::bail!("Extension cannot contain path separators: {}", ext);
            }
        }

        Ok(())
    }

    pub fn inputs(&self) -> Inputs {
        Inputs {
            table: self.table.clone(),
            template: self.template.clone(),
        }
    }

    /// Turn a validated job into engine configuration plus output plan.
    pub fn to_generation(&self) -> Result<(GenerationConfig, OutputPlan)> {
        self.validate()?;

        let (Some(placeholder_row), Some(source), Some(mode), Some(output)) = (
            self.placeholder_row,
            self.name.clone(),
            self.mode,
            self.output.clone(),
        ) else {
            anyhow::bail!("Job is incomplete");
        };

        let mut naming = NamingRule::new(source);
        if let Some(prefix) = &self.name_prefix {
            naming = naming.with_prefix(prefix);
        }
        if let Some(suffix) = &self.name_suffix {
            naming = naming.with_suffix(suffix);
        }
        if let Some(extension) = &self.extension {
            naming = naming.with_extension(extension);
        }

        let mut generation = GenerationConfig::new(placeholder_row, naming)
            .with_direction(self.direction)
            .with_row_error_policy(self.on_row_error);

        if let Some(rules_path) = &self.rules {
            generation = generation.with_rules(load_rule_set(rules_path)?);
        }

        Ok((generation, OutputPlan { mode, path: output }))
    }
}

/// Settings a preset stands for
pub fn preset_defaults(preset: Preset) -> JobConfig {
    match preset {
        Preset::Master => JobConfig {
            placeholder_row: Some(PlaceholderRow::Last),
            name: Some(NameSource::Column(0)),
            name_suffix: Some("_template".to_string()),
            extension: Some("html".to_string()),
            mode: Some(OutputMode::Single),
            output: Some(PathBuf::from(MASTER_OUTPUT_DIR)),
            ..JobConfig::default()
        },
        Preset::Story => JobConfig {
            placeholder_row: Some(PlaceholderRow::First),
            name: Some(NameSource::Column(0)),
            extension: Some("html".to_string()),
            mode: Some(OutputMode::Archive),
            output: Some(PathBuf::from(STORY_ARCHIVE_NAME)),
            ..JobConfig::default()
        },
    }
}

/// Load a rewrite rule file (JSON `{"rewrites": [...], "deletions": [...]}`)
pub fn load_rule_set<P: AsRef<Path>>(path: P) -> Result<RuleSet> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read rules from {:?}", path.as_ref()))?;

    let rules = RuleSet::from_json(&content)
        .with_context(|| format!("Failed to parse rules in {:?}", path.as_ref()))?;

    // Surface bad patterns at load time rather than mid-run.
    rules
        .compile()
        .with_context(|| format!("Invalid pattern in {:?}", path.as_ref()))?;

    Ok(rules)
}

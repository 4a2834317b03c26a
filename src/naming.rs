//! Output file naming.
//!
//! Which cell names an output is always configured explicitly, either by
//! column index or by a header resolved against the placeholder row.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorygenError};

/// Column that supplies the output name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// Zero-based column index
    Column(usize),
    /// Column whose placeholder cell is this name, bare or wrapped in `{{ }}`
    Header(String),
}

/// How a data row becomes a file name: `<prefix><cell><suffix>.<extension>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRule {
    pub source: NameSource,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "html".to_string()
}

impl NamingRule {
    pub fn new(source: NameSource) -> Self {
        Self {
            source,
            prefix: String::new(),
            suffix: String::new(),
            extension: default_extension(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Resolve the name source to a column index against the placeholder row.
    pub fn resolve_column<S: AsRef<str>>(&self, placeholders: &[S]) -> Result<usize> {
        match &self.source {
            NameSource::Column(index) if *index < placeholders.len() => Ok(*index),
            NameSource::Column(index) => Err(StorygenError::naming(format!(
                "name column {} does not exist (placeholder row has {} columns)",
                index,
                placeholders.len()
            ))),
            NameSource::Header(name) => placeholders
                .iter()
                .position(|cell| header_matches(cell.as_ref(), name))
                .ok_or_else(|| {
                    StorygenError::naming(format!(
                        "no placeholder column named {:?}",
                        name
                    ))
                }),
        }
    }

    /// File name for one data row, using the resolved `column`.
    pub fn file_name<S: AsRef<str>>(&self, row: usize, values: &[S], column: usize) -> Result<String> {
        let raw = values
            .get(column)
            .map(|v| v.as_ref().trim())
            .ok_or_else(|| StorygenError::naming(format!("row {}: no cell in name column {}", row, column)))?;

        let stem = sanitize(raw);
        if stem.is_empty() {
            return Err(StorygenError::naming(format!(
                "row {}: name column {} is empty",
                row, column
            )));
        }

        let mut name = format!("{}{}{}", self.prefix, stem, self.suffix);
        let extension = self.extension.trim_start_matches('.');
        if !extension.is_empty() {
            name.push('.');
            name.push_str(extension);
        }
        Ok(name)
    }
}

fn header_matches(cell: &str, name: &str) -> bool {
    let cell = cell.trim();
    if cell == name {
        return true;
    }
    cell.strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .is_some_and(|inner| inner.trim() == name)
}

/// Make a cell value safe to use as a single path component.
///
/// Path separators and other characters that are invalid in file names on
/// common platforms become `_`; a name made only of dots is dropped.
pub fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        String::new()
    } else {
        cleaned
    }
}

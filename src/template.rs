//! Template loading and the input precondition gate.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, StorygenError};
use crate::rewrite::RuleSet;

/// Immutable template text.
///
/// Operations return new templates; the original stays usable for every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a UTF-8 template file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {}", path.display(), e),
            )
        })?;
        info!("Loaded template {} ({} bytes)", path.display(), text.len());
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Normalise the template with a rule set, producing a new template.
    pub fn rewritten(&self, rules: &RuleSet) -> Result<Self> {
        Ok(Self {
            text: rules.apply(&self.text)?,
        })
    }
}

impl AsRef<str> for Template {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// The two files a generation run needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs {
    pub table: Option<PathBuf>,
    pub template: Option<PathBuf>,
}

/// Outcome of checking `Inputs` before a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Ready { table: PathBuf, template: PathBuf },
    /// Something was not supplied; the text is meant for the user
    Missing(String),
}

impl Inputs {
    /// Decide whether a run can start. Absence is not an error, only a notice.
    pub fn gate(self) -> Gate {
        match (self.table, self.template) {
            (Some(table), Some(template)) => Gate::Ready { table, template },
            (None, Some(_)) => Gate::Missing("Please provide a table file (CSV or Excel).".into()),
            (Some(_), None) => Gate::Missing("Please provide an HTML template file.".into()),
            (None, None) => Gate::Missing(
                "Please provide both a table file and an HTML template file.".into(),
            ),
        }
    }

    /// Same check as `gate`, as a `MissingInput` error for callers that prefer one.
    pub fn require(self) -> Result<(PathBuf, PathBuf)> {
        match self.gate() {
            Gate::Ready { table, template } => Ok((table, template)),
            Gate::Missing(notice) => Err(StorygenError::missing_input(notice)),
        }
    }
}

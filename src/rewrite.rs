//! Pattern-based template rewriting.
//!
//! Turns an exported or scraped page into a token-bearing template before it is
//! used for substitution. A `RuleSet` holds ordered rewrite rules followed by
//! deletion patterns. Every pattern is compiled with `.` matching newlines so a
//! single rule can span several lines of markup.
//!
//! Replacement strings use the `regex` crate syntax: `$1`, `${name}`, and `$$`
//! for a literal dollar sign.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StorygenError};

/// One global search-and-replace rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered rewrite rules plus deletion patterns, as stored in a rules file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rewrites: Vec<RewriteRule>,
    #[serde(default)]
    pub deletions: Vec<String>,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty() && self.deletions.is_empty()
    }

    /// Parse a rule set from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile every pattern, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledRules> {
        let rewrites = self
            .rewrites
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                compile_spanning(&rule.pattern)
                    .map(|re| (re, rule.replacement.clone()))
                    .map_err(|e| StorygenError::pattern(format!("rewrite rule {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let deletions = self
            .deletions
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                compile_spanning(pattern)
                    .map_err(|e| StorygenError::pattern(format!("deletion rule {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledRules {
            rewrites,
            deletions,
        })
    }

    /// Compile and apply in one step.
    pub fn apply(&self, text: &str) -> Result<String> {
        Ok(self.compile()?.apply(text))
    }
}

/// A `RuleSet` with every pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRules {
    rewrites: Vec<(Regex, String)>,
    deletions: Vec<Regex>,
}

impl CompiledRules {
    /// Apply the rewrites in order, each over the previous result, then the deletions.
    ///
    /// A rule that matches nothing leaves the text unchanged.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();

        for (i, (pattern, replacement)) in self.rewrites.iter().enumerate() {
            if let Cow::Owned(next) = pattern.replace_all(&current, replacement.as_str()) {
                debug!("Rewrite rule {} matched", i);
                current = next;
            }
        }

        for (i, pattern) in self.deletions.iter().enumerate() {
            if let Cow::Owned(next) = pattern.replace_all(&current, "") {
                debug!("Deletion rule {} matched", i);
                current = next;
            }
        }

        current
    }
}

fn compile_spanning(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).dot_matches_new_line(true).build()
}

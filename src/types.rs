//! Type-safe generation settings for storygen
//!
//! Every convention that varied between the old generator variants (which row
//! holds the placeholders, how outputs are packaged, which way the substitution
//! runs) is an explicit enum here rather than an assumption baked into the engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Which row of the table holds the placeholder tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlaceholderRow {
    First,
    Last,
}

/// How generated outputs are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputMode {
    /// One file per row, written into a directory
    Single,
    /// All rows packed into one zip archive
    Archive,
}

/// Direction of the substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Replace placeholder tokens with row values
    #[default]
    #[strum(serialize = "token_to_value")]
    TokenToValue,
    /// Replace row values with placeholder tokens (turns a filled page back into a template)
    #[strum(serialize = "value_to_token")]
    ValueToToken,
}

/// What the generator does when a single row fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RowErrorPolicy {
    /// Record the failure and continue with the next row
    #[default]
    Skip,
    /// Stop the whole run on the first failing row
    Abort,
}

/// Named bundles of settings matching the two classic generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Preset {
    /// Placeholders in the last row, one `<name>_template.html` file per row
    Master,
    /// Placeholders in the first row, all `<name>.html` files in one zip
    Story,
}

impl OutputMode {
    /// Check if this mode produces a single archive file
    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive)
    }
}

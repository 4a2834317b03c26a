//! Placeholder map construction.
//!
//! A `PlaceholderMap` pairs the cells of the placeholder row with the cells of
//! one data row by position. Rows of different length are rejected outright;
//! nothing is truncated or padded.

use crate::error::{Result, StorygenError};

/// Position-paired `(token, value)` entries for one data row.
///
/// Keys are kept exactly as they appear in the placeholder row, duplicates
/// included. How duplicates resolve is decided by the substituter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    /// Pair `placeholders[i]` with `values[i]` for every column.
    ///
    /// `row` is the table row index of `values` and only appears in the error.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the two rows differ in length.
    ///
    /// # Example
    ///
    /// ```
    /// use storygen::placeholder::PlaceholderMap;
    ///
    /// let map = PlaceholderMap::build(1, &["{{name}}"], &["Ada"]).unwrap();
    /// assert_eq!(map.get("{{name}}"), Some("Ada"));
    ///
    /// assert!(PlaceholderMap::build(2, &["{{a}}", "{{b}}"], &["x"]).is_err());
    /// ```
    pub fn build<P, V>(row: usize, placeholders: &[P], values: &[V]) -> Result<Self>
    where
        P: AsRef<str>,
        V: AsRef<str>,
    {
        if placeholders.len() != values.len() {
            return Err(StorygenError::ShapeMismatch {
                row,
                placeholders: placeholders.len(),
                values: values.len(),
            });
        }

        let entries = placeholders
            .iter()
            .zip(values)
            .map(|(token, value)| (token.as_ref().to_string(), value.as_ref().to_string()))
            .collect();

        Ok(Self { entries })
    }

    /// Build a map directly from pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Swap every pair so values become the search keys.
    pub fn reversed(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(token, value)| (value.clone(), token.clone()))
                .collect(),
        }
    }

    /// Value of the first entry whose token equals `token`.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

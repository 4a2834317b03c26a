//! Literal token substitution.
//!
//! All tokens are compiled into one alternation ordered longest-first, and the
//! template is scanned once. At every position the longest matching token wins,
//! and text produced by a replacement is never scanned again, so a value that
//! happens to contain another token stays as written.

use std::collections::HashMap;

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{Result, StorygenError};
use crate::placeholder::PlaceholderMap;

/// Compiled matcher for a fixed set of tokens.
///
/// Build once per placeholder row and reuse it for every data row.
#[derive(Debug, Clone)]
pub struct Substituter {
    pattern: Option<Regex>,
}

impl Substituter {
    /// Compile a matcher for `tokens`.
    ///
    /// Empty tokens are dropped since they would match at every position.
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            if !token.is_empty() && !unique.iter().any(|t| t == token) {
                unique.push(token.to_string());
            }
        }

        if unique.is_empty() {
            return Ok(Self { pattern: None });
        }

        // Alternation is leftmost-first: longest tokens must come first.
        unique.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = unique
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&alternation)
            .map_err(|e| StorygenError::pattern(format!("cannot compile token set: {}", e)))?;

        debug!("Compiled substituter for {} tokens", unique.len());
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Replace every token of `map` in `template` with its value.
    ///
    /// Tokens the substituter was not compiled for are left untouched. When a
    /// token occurs more than once in `map`, its first pairing is used.
    pub fn apply(&self, template: &str, map: &PlaceholderMap) -> String {
        let Some(pattern) = &self.pattern else {
            return template.to_string();
        };

        let mut lookup: HashMap<&str, &str> = HashMap::with_capacity(map.len());
        for (token, value) in map.iter() {
            lookup.entry(token).or_insert(value);
        }

        pattern
            .replace_all(template, |caps: &Captures| {
                let matched = &caps[0];
                lookup.get(matched).copied().unwrap_or(matched).to_string()
            })
            .into_owned()
    }
}

/// One-shot substitution of `map` into `template`.
///
/// # Example
///
/// ```
/// use storygen::placeholder::PlaceholderMap;
/// use storygen::substitute::substitute;
///
/// let map = PlaceholderMap::from_pairs([("{{name}}", "Ada"), ("{{site}}", "example.com")]);
/// let out = substitute("Hello {{name}}, visit {{site}}", &map).unwrap();
/// assert_eq!(out, "Hello Ada, visit example.com");
/// ```
pub fn substitute(template: &str, map: &PlaceholderMap) -> Result<String> {
    let substituter = Substituter::new(map.tokens())?;
    Ok(substituter.apply(template, map))
}

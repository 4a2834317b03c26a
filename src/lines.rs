//! Structural line editing.
//!
//! Text is handled as the sequence of pieces produced by splitting on `\n`, so
//! joining them back with `\n` restores the text exactly. A trailing newline
//! shows up as a final empty line, and the empty string is one empty line. All
//! line numbers are 1-indexed.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{Result, StorygenError};

/// A text blob split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
struct Lines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Lines<'a> {
    fn split(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
        }
    }

    fn join(&self) -> String {
        self.lines.join("\n")
    }

    /// Add `content` as the last line of the file. A final empty line is the
    /// file's trailing newline and stays after the content.
    fn append(&mut self, content: &'a str) {
        match self.lines.last() {
            Some(last) if last.is_empty() => {
                let end = self.lines.len() - 1;
                self.lines.insert(end, content);
            }
            _ => self.lines.push(content),
        }
    }
}

/// Number of lines in `text` as the editor counts them.
pub fn line_count(text: &str) -> usize {
    Lines::split(text).lines.len()
}

/// Insert `content` immediately before line `line`.
///
/// `line` may be one past the last line, which appends.
///
/// # Errors
///
/// `OutOfRange` when `line` is 0 or greater than the line count plus one.
///
/// # Example
///
/// ```
/// use storygen::lines::insert_at_line;
///
/// assert_eq!(insert_at_line("a\nc", 2, "b").unwrap(), "a\nb\nc");
/// assert!(insert_at_line("a\nc", 4, "x").is_err());
/// ```
pub fn insert_at_line(text: &str, line: usize, content: &str) -> Result<String> {
    let mut doc = Lines::split(text);
    let count = doc.lines.len();

    if line < 1 || line > count + 1 {
        return Err(StorygenError::OutOfRange { line, lines: count });
    }

    doc.lines.insert(line - 1, content);
    Ok(doc.join())
}

/// Remove every line listed in `lines`.
///
/// The result depends only on the set of line numbers, not on their order or
/// repetition. All indices are checked before anything is removed.
///
/// # Errors
///
/// `OutOfRange` when any index is outside `1..=line_count`.
///
/// # Example
///
/// ```
/// use storygen::lines::remove_lines;
///
/// assert_eq!(remove_lines("a\nb\nc\nd", &[3]).unwrap(), "a\nb\nd");
/// ```
pub fn remove_lines(text: &str, lines: &[usize]) -> Result<String> {
    let mut doc = Lines::split(text);
    let count = doc.lines.len();

    if let Some(&bad) = lines.iter().find(|&&l| l < 1 || l > count) {
        return Err(StorygenError::OutOfRange {
            line: bad,
            lines: count,
        });
    }

    let targets: BTreeSet<usize> = lines.iter().copied().collect();
    // High to low so earlier removals never shift later targets.
    for line in targets.into_iter().rev() {
        doc.lines.remove(line - 1);
    }

    Ok(doc.join())
}

/// Where `insert_relative_to_anchors` placed the content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorPlacement {
    /// Both anchors found: before the line matching anchor B (1-indexed)
    BeforeB(usize),
    /// Only anchor A found: after the line matching anchor A (1-indexed)
    AfterA(usize),
    /// Neither anchor usable: appended as the last line
    Appended,
}

/// Insert `content` relative to two anchor patterns.
///
/// - both anchors match some line: insert before the first line matching `anchor_b`
/// - only `anchor_a` matches: insert after the first line matching `anchor_a`
/// - otherwise: append as the final line, ahead of a trailing newline
///
/// Anchors are regular expressions searched for anywhere within a line.
pub fn insert_relative_to_anchors(
    text: &str,
    anchor_a: &str,
    anchor_b: &str,
    content: &str,
) -> Result<(String, AnchorPlacement)> {
    let anchor_a = compile_anchor("A", anchor_a)?;
    let anchor_b = compile_anchor("B", anchor_b)?;

    let mut doc = Lines::split(text);
    let first_a = doc.lines.iter().position(|l| anchor_a.is_match(l));
    let first_b = doc.lines.iter().position(|l| anchor_b.is_match(l));

    let placement = match (first_a, first_b) {
        (Some(_), Some(b)) => {
            doc.lines.insert(b, content);
            AnchorPlacement::BeforeB(b + 1)
        }
        (Some(a), None) => {
            doc.lines.insert(a + 1, content);
            AnchorPlacement::AfterA(a + 1)
        }
        _ => {
            doc.append(content);
            AnchorPlacement::Appended
        }
    };

    Ok((doc.join(), placement))
}

fn compile_anchor(label: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| StorygenError::pattern(format!("anchor {}: {}", label, e)))
}

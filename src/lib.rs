//! storygen Library
//!
//! Substitutes the rows of a table into an HTML template, producing one output
//! per data row, and ships the small text tools used to prepare templates:
//! regex rewrite rules and line-level edits.

pub mod cli;
pub mod config_file;
pub mod error;
pub mod generator;
pub mod lines;
pub mod naming;
pub mod placeholder;
pub mod rewrite;
pub mod sink;
pub mod substitute;
pub mod table;
pub mod template;
pub mod types;

// Re-export main types for convenience
pub use config_file::JobConfig;
pub use error::{Result, StorygenError};
pub use generator::{GenerationConfig, GenerationReport, Generator, RowFailure};
pub use lines::{insert_at_line, insert_relative_to_anchors, remove_lines, AnchorPlacement};
pub use naming::{NameSource, NamingRule};
pub use placeholder::PlaceholderMap;
pub use rewrite::{RewriteRule, RuleSet};
pub use sink::{ArchiveSink, DirectorySink, MemorySink, OutputRecord, OutputSink};
pub use substitute::{substitute, Substituter};
pub use table::Table;
pub use template::{Gate, Inputs, Template};
pub use types::{Direction, OutputMode, PlaceholderRow, Preset, RowErrorPolicy};

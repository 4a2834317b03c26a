use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config_file::JobConfig;
use crate::naming::NameSource;
use crate::types::{Direction, OutputMode, PlaceholderRow, Preset, RowErrorPolicy};

/// storygen - Generate web stories from a spreadsheet and an HTML template
#[derive(Parser)]
#[command(name = "storygen")]
#[command(about = "Substitute spreadsheet rows into an HTML template and emit the results")]
#[command(version)]
pub struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one output per data row
    Generate(GenerateArgs),
    /// Normalise a page into a template with a rules file
    Rewrite {
        /// Page or template to rewrite
        #[arg(short, long)]
        template: PathBuf,
        /// JSON rules file with "rewrites" and "deletions"
        #[arg(short, long)]
        rules: PathBuf,
        /// Where to write the result (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Line-level edits on a text file
    Lines {
        #[command(subcommand)]
        edit: LineCommands,
    },
    /// Validate a job file
    Validate {
        /// Path to job file to validate
        config: PathBuf,
    },
    /// Write a job file, optionally pre-filled from a preset
    InitConfig {
        /// Where to write the job file
        path: PathBuf,
        /// Preset to fill the job from (master, story)
        #[arg(short, long)]
        preset: Option<Preset>,
    },
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Job file to start from; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Preset filling any unset option (master, story)
    #[arg(short, long)]
    pub preset: Option<Preset>,

    /// Table of values (.csv, .xlsx, .xls, .ods)
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// HTML template
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Rewrite rules applied to the template before substitution
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Row holding the placeholders (first, last)
    #[arg(long)]
    pub placeholder_row: Option<PlaceholderRow>,

    /// Zero-based column supplying output names
    #[arg(long, conflicts_with = "name_header")]
    pub name_column: Option<usize>,

    /// Placeholder header of the column supplying output names (e.g. slug)
    #[arg(long)]
    pub name_header: Option<String>,

    /// Text placed before each output name
    #[arg(long)]
    pub name_prefix: Option<String>,

    /// Text placed after each output name, before the extension
    #[arg(long)]
    pub name_suffix: Option<String>,

    /// Output file extension
    #[arg(long)]
    pub extension: Option<String>,

    /// Output mode (single, archive)
    #[arg(short, long)]
    pub mode: Option<OutputMode>,

    /// Output directory (single) or archive path (archive)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Substitution direction (token_to_value, value_to_token)
    #[arg(long)]
    pub direction: Option<Direction>,

    /// What to do when a row fails (skip, abort)
    #[arg(long)]
    pub on_row_error: Option<RowErrorPolicy>,
}

impl GenerateArgs {
    /// Flags as a partial job; `None` where the flag was not given.
    pub fn to_overrides(&self) -> JobConfig {
        let name = match (self.name_column, &self.name_header) {
            (Some(index), _) => Some(NameSource::Column(index)),
            (None, Some(header)) => Some(NameSource::Header(header.clone())),
            (None, None) => None,
        };

        JobConfig {
            preset: self.preset,
            table: self.table.clone(),
            template: self.template.clone(),
            rules: self.rules.clone(),
            placeholder_row: self.placeholder_row,
            name,
            name_prefix: self.name_prefix.clone(),
            name_suffix: self.name_suffix.clone(),
            extension: self.extension.clone(),
            mode: self.mode,
            output: self.output.clone(),
            direction: self.direction.unwrap_or_default(),
            on_row_error: self.on_row_error.unwrap_or_default(),
        }
    }

    /// Merge flags over `base` (usually a loaded job file) and apply the preset.
    pub fn resolve(&self, base: JobConfig) -> JobConfig {
        let mut job = self.to_overrides().or(base.clone());
        job.direction = self.direction.unwrap_or(base.direction);
        job.on_row_error = self.on_row_error.unwrap_or(base.on_row_error);
        job.with_preset_applied()
    }
}

#[derive(Subcommand)]
pub enum LineCommands {
    /// Insert content before a 1-indexed line
    Insert {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        line: usize,
        #[arg(short, long)]
        content: String,
        /// Where to write the result (in place if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove 1-indexed lines
    Remove {
        #[arg(short, long)]
        file: PathBuf,
        /// Comma-separated line numbers, in any order
        #[arg(short, long, value_delimiter = ',', required = true)]
        lines: Vec<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Insert before anchor B if both anchors exist, else after anchor A, else append
    Anchor {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long)]
        anchor_a: String,
        #[arg(long)]
        anchor_b: String,
        #[arg(short, long)]
        content: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! storygen - Main entry point
//!
//! Parses the command line, sets up logging and dispatches to the library.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use storygen::cli::{Cli, Commands, GenerateArgs, LineCommands};
use storygen::config_file::{load_rule_set, preset_defaults, JobConfig, OutputPlan};
use storygen::lines::{insert_at_line, insert_relative_to_anchors, remove_lines};
use storygen::sink::{ArchiveSink, DirectorySink, OutputSink};
use storygen::template::Gate;
use storygen::{Generator, Table, Template};

/// Initialize logging: info by default, debug with --verbose, RUST_LOG wins.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);
    debug!("CLI arguments parsed");

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Rewrite {
            template,
            rules,
            output,
        } => run_rewrite(&template, &rules, output.as_deref()),
        Commands::Lines { edit } => run_line_edit(edit),
        Commands::Validate { config } => run_validate(&config),
        Commands::InitConfig { path, preset } => run_init_config(&path, preset),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => {
            info!("Loading job file {:?}", path);
            JobConfig::load_from_file(path)?
        }
        None => JobConfig::default(),
    };
    let job = args.resolve(base);

    let (table_path, template_path) = match job.inputs().gate() {
        Gate::Ready { table, template } => (table, template),
        Gate::Missing(notice) => {
            // Nothing to generate yet; tell the user what is missing.
            info!("Generation skipped: {}", notice);
            println!("ℹ {}", notice);
            return Ok(());
        }
    };

    let (generation, plan) = job.to_generation()?;

    let table = Table::load(&table_path)
        .with_context(|| format!("Failed to load table {:?}", table_path))?;
    let template = Template::load(&template_path)
        .with_context(|| format!("Failed to load template {:?}", template_path))?;

    let mut sink = open_sink(&plan)?;
    let report = Generator::new(generation)
        .run(&table, &template, sink.as_mut())
        .context("Generation failed")?;

    let location = report
        .location
        .as_deref()
        .unwrap_or(plan.path.as_path())
        .display()
        .to_string();
    println!(
        "✓ Generated {} files ({})",
        report.generated.len(),
        location
    );
    for name in &report.overwritten {
        println!("  ⚠ {} was produced by more than one row; the last one was kept", name);
    }
    for failure in &report.skipped {
        println!("  ✗ skipped row {}: {}", failure.row, failure.message);
    }

    Ok(())
}

fn open_sink(plan: &OutputPlan) -> Result<Box<dyn OutputSink>> {
    if plan.mode.is_archive() {
        return Ok(Box::new(ArchiveSink::new(&plan.path)));
    }
    let sink = DirectorySink::new(&plan.path)
        .with_context(|| format!("Failed to create output directory {:?}", plan.path))?;
    Ok(Box::new(sink))
}

fn run_rewrite(template: &Path, rules: &Path, output: Option<&Path>) -> Result<()> {
    let rules = load_rule_set(rules)?;
    let page = Template::load(template)
        .with_context(|| format!("Failed to load template {:?}", template))?;
    let rewritten = page.rewritten(&rules)?;

    match output {
        Some(path) => {
            std::fs::write(path, rewritten.as_str())
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("Rewrote {:?} into {:?}", template, path);
            println!("✓ Template written to {}", path.display());
        }
        None => print!("{}", rewritten.as_str()),
    }
    Ok(())
}

fn run_line_edit(edit: LineCommands) -> Result<()> {
    let (file, output, edited) = match edit {
        LineCommands::Insert {
            file,
            line,
            content,
            output,
        } => {
            let text = read_text(&file)?;
            let edited = insert_at_line(&text, line, &content)?;
            (file, output, edited)
        }
        LineCommands::Remove {
            file,
            lines,
            output,
        } => {
            let text = read_text(&file)?;
            let edited = remove_lines(&text, &lines)?;
            (file, output, edited)
        }
        LineCommands::Anchor {
            file,
            anchor_a,
            anchor_b,
            content,
            output,
        } => {
            let text = read_text(&file)?;
            let (edited, placement) =
                insert_relative_to_anchors(&text, &anchor_a, &anchor_b, &content)?;
            info!("Anchor insert placement: {:?}", placement);
            (file, output, edited)
        }
    };

    let destination: PathBuf = output.unwrap_or(file);
    std::fs::write(&destination, edited)
        .with_context(|| format!("Failed to write {:?}", destination))?;
    println!("✓ Updated {}", destination.display());
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn run_validate(config: &Path) -> Result<()> {
    info!("Validating job file: {:?}", config);
    let job = JobConfig::load_from_file(config)?.with_preset_applied();
    job.to_generation()?;

    if let Gate::Missing(notice) = job.inputs().gate() {
        println!("ℹ {}", notice);
    }
    println!("✓ Job file is valid: {}", config.display());
    Ok(())
}

fn run_init_config(path: &Path, preset: Option<storygen::types::Preset>) -> Result<()> {
    let job = match preset {
        Some(preset) => JobConfig {
            preset: Some(preset),
            ..preset_defaults(preset)
        },
        None => JobConfig::default(),
    };
    job.save_to_file(path)?;
    println!("✓ Job file written to {}", path.display());
    Ok(())
}

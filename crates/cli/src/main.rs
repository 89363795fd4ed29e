mod model_file;
mod report;

use anyhow::{Context, Result};
use argkit::{LayeredCommandLine, ParseError};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::model_file::{DEFAULT_MODEL_NAME, load_model, read_preset, write_default_model};

/// Exit status for a command line rejected by the model (`parse --json`).
const EXIT_PARSE_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "argkit")]
#[command(version, about = "Declarative command-line option parsing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample argkit.json option model
    Init(InitArgs),

    /// Validate an option model and summarize it
    Check(CheckArgs),

    /// Parse arguments against an option model and print the result as JSON
    Parse(ParseArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Model name (default: directory name)
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the option model
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the option model
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Treat the first non-option argument and everything after it as positional
    #[arg(long)]
    stop_at_non_option: bool,

    /// File with one argument per line, consulted for options missing from ARGS
    #[arg(long, value_name = "FILE")]
    preset: Option<PathBuf>,

    /// Report parse errors as JSON on stdout (exit status 2)
    #[arg(long)]
    json: bool,

    /// Arguments to parse
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check_command(args),
        Commands::Parse(args) => parse_command(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let model_path = write_default_model(&dir, args.name.as_deref())?;

    eprintln!("Created: {}", model_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_MODEL_NAME} to declare your options");
    eprintln!("  2. Run: argkit check");
    eprintln!("  3. Run: argkit parse -- -v --output out.txt input");

    Ok(())
}

fn check_command(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let loaded = load_model(args.model.as_deref())?;
    let report = report::check_report(
        &loaded.def.name,
        &loaded.path.display().to_string(),
        &loaded.model,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    eprintln!();
    eprintln!("=== Option Model ===");
    if !report.name.is_empty() {
        eprintln!("Name: {}", report.name);
    }
    eprintln!("Source: {}", report.source);
    eprintln!("Options: {}", report.options.len());
    for row in &report.options {
        let short = row.short.as_deref().map(|s| format!("-{s}")).unwrap_or_default();
        let long = row.long.as_deref().map(|l| format!("--{l}")).unwrap_or_default();
        let mut notes = Vec::new();
        if row.required {
            notes.push("required".to_string());
        }
        if let Some(g) = row.group {
            notes.push(format!("group {g}"));
        }
        if !row.default_values.is_empty() {
            notes.push(format!("default {}", row.default_values.join(",")));
        }
        if let Some(check) = &row.check {
            notes.push(check.clone());
        }
        eprintln!("  {short:<4} {long:<20} {:<6} {}", row.arity, notes.join(", "));
    }
    for group in &report.groups {
        eprintln!(
            "Group {}{}: {}",
            group.index,
            if group.required { " (required)" } else { "" },
            group.members.join(" | ")
        );
    }
    eprintln!("OK: model is valid");

    Ok(())
}

fn parse_command(args: ParseArgs) -> Result<()> {
    tracing::debug!(args = args.args.len(), "executing parse command");

    let loaded = load_model(args.model.as_deref())?;
    let preset_args = match &args.preset {
        Some(path) => read_preset(path)?,
        None => Vec::new(),
    };

    // Layers skip the required checks; they run once on the merged view.
    let parsed = argkit::parse_layer(&loaded.model, &args.args, args.stop_at_non_option)
        .and_then(|cl| {
            let preset = args
                .preset
                .is_some()
                .then(|| argkit::parse_layer(&loaded.model, &preset_args, false))
                .transpose()?;
            Ok((cl, preset))
        });

    let (cl, preset) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return parse_failure(err, args.json),
    };

    let mut layered = LayeredCommandLine::new();
    layered.append(&cl);
    if let Some(preset) = &preset {
        layered.append(preset);
    }
    if let Err(err) = layered.validate() {
        return parse_failure(err, args.json);
    }

    let report = report::parse_report(&loaded.model, &layered);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn parse_failure(err: ParseError, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::error_report(&err))?
        );
        std::process::exit(EXIT_PARSE_ERROR);
    }
    Err(err).context("failed to parse arguments")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

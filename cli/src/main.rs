mod config;
mod error;
mod output;
mod script;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use field_schema_core::{SchemaSession, duplicate_keys, export};
use tracing::warn;

use crate::config::BuilderConfig;
use crate::error::{CliError, Result};
use crate::output::{OutputFormat, format_document, render_duplicates, render_outline};
use crate::script::{read_script, run_script};

#[derive(Debug, Parser)]
#[command(name = "schema-builder")]
#[command(about = "Build nested field schemas from edit scripts and export placeholder JSON")]
#[command(version)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log applied edits to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply an edit script and print the exported placeholder document.
    Export(ExportArgs),
    /// Apply an edit script and print the resulting field tree.
    Outline(ScriptArgs),
    /// Apply an edit script and report sibling fields sharing a key.
    Check(CheckArgs),
    /// Write a configuration file with default settings.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct ScriptArgs {
    /// Edit script (YAML or JSON). Reads stdin when omitted or `-`.
    script: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    input: ScriptArgs,
    /// Output format (default: json, or the config file's choice).
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,
    /// Print the document after every edit.
    #[arg(long)]
    echo: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    input: ScriptArgs,
    /// Exit with an error when duplicate keys are found.
    #[arg(long)]
    deny_duplicates: bool,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Path of the configuration file to create.
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => BuilderConfig::load(path)?,
        None => BuilderConfig::default(),
    };

    match cli.command {
        Command::Export(args) => run_export(args, &config),
        Command::Outline(args) => run_outline(args),
        Command::Check(args) => run_check(args, &config),
        Command::InitConfig(args) => run_init_config(args),
    }
}

fn run_export(args: ExportArgs, config: &BuilderConfig) -> Result<()> {
    let edits = read_script(args.input.script.as_deref())?;
    let format = args.format.unwrap_or(config.output.format);
    let compact = args.compact || config.output.compact;

    let mut session = SchemaSession::new();
    if args.echo || config.output.echo {
        session.on_change(move |tree, version| {
            match format_document(&export(tree), format, compact) {
                Ok(text) => println!("# version {version}\n{text}"),
                Err(err) => warn!(version, error = %err, "Failed to render document"),
            }
        });
    }

    run_script(&mut session, &edits)?;
    println!("{}", format_document(&session.export(), format, compact)?);
    Ok(())
}

fn run_outline(args: ScriptArgs) -> Result<()> {
    let edits = read_script(args.script.as_deref())?;
    let mut session = SchemaSession::new();
    run_script(&mut session, &edits)?;
    print!("{}", render_outline(session.tree()));
    Ok(())
}

fn run_check(args: CheckArgs, config: &BuilderConfig) -> Result<()> {
    let edits = read_script(args.input.script.as_deref())?;
    let mut session = SchemaSession::new();
    run_script(&mut session, &edits)?;

    let tree = session.tree();
    let duplicates = duplicate_keys(tree);
    let unnamed = tree.iter().filter(|node| node.key().is_empty()).count();

    print!("{}", render_duplicates(&duplicates));
    println!(
        "Checked {} field(s), {} unnamed (not exported).",
        tree.len(),
        unnamed
    );

    if !duplicates.is_empty() && (args.deny_duplicates || config.check.deny_duplicates) {
        return Err(CliError::DuplicateKeys(duplicates.len()));
    }
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<()> {
    BuilderConfig::default().save(&args.path)?;
    println!("Wrote default configuration to '{}'.", args.path.display());
    Ok(())
}

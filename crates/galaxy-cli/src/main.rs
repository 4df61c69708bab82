//! Galaxy CLI - Plan which release and secret files every environment gets

use clap::{Parser, Subcommand};
use galaxy_core::{DEFAULT_CONFIG_FILE, DotGalaxy, Galaxy, Options};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use commands::plan::OutputFormat;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "galaxy")]
#[command(version)]
#[command(about = "Plan release and secret files per environment", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, env = "GALAXY_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Environments to plan, comma separated (default: all)
    #[arg(short, long, global = true)]
    environments: Option<String>,

    /// Namespaces to scan, comma separated (default: all)
    #[arg(short, long, global = true)]
    namespaces: Option<String>,

    /// Logging level or filter directive
    #[arg(short, long, global = true, default_value = "error")]
    log_level: String,

    /// Plan environments concurrently
    #[arg(long, global = true)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List files planned for each environment
    List,

    /// Print the plan handed over to release and secret tooling
    Plan {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Show environments, namespaces and releases as a tree
    Tree,

    /// Compare releases across environments
    Compare,
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_level)?;

    let dot_galaxy = DotGalaxy::load_from(&cli.config)?;
    let options = Options {
        environments: cli
            .environments
            .as_deref()
            .map(Options::parse_list)
            .unwrap_or_default(),
        namespaces: cli
            .namespaces
            .as_deref()
            .map(Options::parse_list)
            .unwrap_or_default(),
    };

    let span = tracing::info_span!("galaxy", config = %cli.config.display());
    let mut galaxy = Galaxy::new(dot_galaxy, options, span);

    if cli.parallel {
        galaxy.plan_parallel()?;
    } else {
        galaxy.plan()?;
    }

    match cli.command {
        Commands::List => commands::list::run(&galaxy),
        Commands::Plan { output } => commands::plan::run(&galaxy, output),
        Commands::Tree => commands::tree::run(&galaxy),
        Commands::Compare => commands::compare::run(&galaxy),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).map_err(|e| CliError::LogLevel {
        level: level.to_string(),
        message: e.to_string(),
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

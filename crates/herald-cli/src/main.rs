//! Herald CLI - Release packaging and announcements with Jinja2 templates

use clap::{Parser, Subcommand};
use herald_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::RunSettings;

#[derive(Parser)]
#[command(name = "herald")]
#[command(author = "Herald Contributors")]
#[command(version)]
#[command(about = "Release packaging and announcements with Jinja2 templates", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Release configuration file
    #[arg(short, long, global = true, env = "HERALD_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Render everything but contact no service
    #[arg(long, global = true)]
    dry_run: bool,

    /// Stop at the first failed target and exit non-zero
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Number of targets processed concurrently
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Directory for generated files
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Run only the named target (repeatable)
    #[arg(long, global = true, value_name = "TARGET")]
    only: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate package manifests
    Package,

    /// Announce the release
    Announce,

    /// Generate package manifests, then announce
    Release,

    /// Show the configuration with credentials masked
    Config {
        /// Print the parsed configuration file as YAML
        #[arg(long)]
        yaml: bool,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let settings = RunSettings {
        config: cli.config,
        dry_run: cli.dry_run,
        fail_fast: cli.fail_fast,
        jobs: cli.jobs,
        output_dir: cli.output_dir,
        only: cli.only,
    };

    let result = match cli.command {
        Commands::Package => commands::package::run(&settings).await,
        Commands::Announce => commands::announce::run(&settings).await,
        Commands::Release => commands::release::run(&settings).await,
        Commands::Config { yaml } => commands::config::run(&settings.config, yaml),
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

//! CLI commands

pub mod announce;
pub mod config;
pub mod package;
pub mod release;

use console::style;
use herald_core::HeraldConfig;
use herald_engine::Engine;
use herald_publish::{
    CancellationFlag, DispatchOptions, Dispatcher, FailurePolicy, Processor, resolve_model,
};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::display;
use crate::error::{CliError, Result};

/// Command-line overrides for the `run` section of the configuration
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub config: PathBuf,
    pub dry_run: bool,
    pub fail_fast: bool,
    pub jobs: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub only: Vec<String>,
}

impl RunSettings {
    fn dispatch_options(&self, config: &HeraldConfig) -> Result<DispatchOptions> {
        let jobs = self.jobs.unwrap_or(config.run.jobs);
        if jobs == 0 {
            return Err(CliError::usage(
                "--jobs must be at least 1",
                "Use --jobs 1 to process targets one at a time",
            ));
        }

        let policy = if self.fail_fast || config.run.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::BestEffort
        };

        // Relative paths from the file are anchored at its directory
        let output_dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => config.base_dir.join(&config.run.output_directory),
        };

        Ok(DispatchOptions {
            policy,
            jobs,
            dry_run: self.dry_run || config.run.dry_run,
            output_dir,
            only: self.only.clone(),
        })
    }
}

pub(crate) fn load_config(path: &Path) -> Result<HeraldConfig> {
    Ok(HeraldConfig::load_from(path)?)
}

/// Reject `--only` names that match none of `targets`
fn check_selection(only: &[String], targets: &[Box<dyn Processor>]) -> Result<()> {
    let known: Vec<&str> = targets.iter().map(|t| t.name()).collect();
    match only.iter().find(|name| !known.contains(&name.as_str())) {
        Some(unknown) => Err(CliError::usage(
            format!("Unknown target `{}`", unknown),
            format!("This command runs: {}", known.join(", ")),
        )),
        None => Ok(()),
    }
}

/// Load the configuration, resolve the release and dispatch `targets`
pub(crate) async fn execute(
    settings: &RunSettings,
    action: &str,
    targets: fn(&HeraldConfig) -> Vec<Box<dyn Processor>>,
) -> Result<()> {
    let config = load_config(&settings.config)?;
    let options = settings.dispatch_options(&config)?;

    let engine = Engine::default();
    let model = resolve_model(&config, &engine)?;

    let targets = targets(&config);
    check_selection(&options.only, &targets)?;

    println!(
        "{} {} {} {}{}",
        style("→").blue(),
        action,
        style(&model.project.name).cyan(),
        model.project.version,
        if options.dry_run {
            style(" (dry run)").yellow().to_string()
        } else {
            String::new()
        }
    );

    let cancel = CancellationFlag::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, no further targets will start");
            interrupt.cancel();
        }
    });

    let summary = Dispatcher::new(&engine, &model, options)
        .with_cancellation(cancel)
        .run(&targets)
        .await;

    display::print_summary(&summary);

    if summary.is_failure() {
        return Err(CliError::run_failed(summary.failures()));
    }
    Ok(())
}

//! Drives every target through context, render and delivery
//!
//! Targets are independent: each one gets its own context and its failure
//! is recorded against it alone. Under [`FailurePolicy::FailFast`] the first
//! failure trips the [`CancellationFlag`], and targets that have not started
//! yet are skipped. Outcomes always come back in target order, whatever the
//! concurrency.

use futures::stream::{self, StreamExt};
use herald_core::ReleaseModel;
use herald_engine::Engine;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::error::{Stage, StageError, TargetFailure};
use crate::processor::{DeliveryOptions, Processor, TargetKind};

/// What a failed target means for the rest of the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and carry on; the run succeeds
    #[default]
    BestEffort,
    /// Stop starting new targets and fail the run
    FailFast,
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub policy: FailurePolicy,
    /// Targets processed concurrently (at least 1)
    pub jobs: usize,
    pub dry_run: bool,
    pub output_dir: PathBuf,
    /// Only run these targets; empty means all
    pub only: Vec<String>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::default(),
            jobs: 1,
            dry_run: false,
            output_dir: PathBuf::from(herald_core::config::DEFAULT_OUTPUT_DIRECTORY),
            only: Vec::new(),
        }
    }
}

impl DispatchOptions {
    fn is_selected(&self, name: &str) -> bool {
        self.only.is_empty() || self.is_requested(name)
    }

    fn is_requested(&self, name: &str) -> bool {
        self.only.iter().any(|n| n == name)
    }

    fn delivery(&self) -> DeliveryOptions {
        DeliveryOptions {
            output_dir: self.output_dir.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Shared stop signal, tripped by fail-fast or an interrupt
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    NotSelected,
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::NotSelected => write!(f, "not selected"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Terminal state of one target
#[derive(Debug)]
pub enum TargetState {
    Skipped(SkipReason),
    Delivered { simulated: bool, detail: String },
    Failed(TargetFailure),
}

#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub kind: TargetKind,
    pub state: TargetState,
}

impl TargetOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.state, TargetState::Failed(_))
    }

    pub fn failure(&self) -> Option<&TargetFailure> {
        match &self.state {
            TargetState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Per-target results of one run, in target order
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<TargetOutcome>,
    pub policy: FailurePolicy,
}

impl RunSummary {
    pub fn outcome(&self, target: &str) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetFailure> {
        self.outcomes.iter().filter_map(TargetOutcome::failure)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.state, TargetState::Delivered { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.state, TargetState::Skipped(_)))
            .count()
    }

    /// Whether the run as a whole failed; best-effort runs never do
    pub fn is_failure(&self) -> bool {
        self.policy == FailurePolicy::FailFast && self.has_failures()
    }
}

pub struct Dispatcher<'a> {
    engine: &'a Engine,
    model: &'a ReleaseModel,
    options: DispatchOptions,
    cancel: CancellationFlag,
}

impl<'a> Dispatcher<'a> {
    pub fn new(engine: &'a Engine, model: &'a ReleaseModel, options: DispatchOptions) -> Self {
        Self {
            engine,
            model,
            options,
            cancel: CancellationFlag::new(),
        }
    }

    /// Share an externally controlled flag (Ctrl-C handling)
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    /// Process `targets`, at most `jobs` at a time
    pub async fn run(&self, targets: &[Box<dyn Processor>]) -> RunSummary {
        let jobs = self.options.jobs.max(1);
        debug!("dispatching {} target(s), {} at a time", targets.len(), jobs);

        let outcomes = stream::iter(targets)
            .map(|target| self.process(target.as_ref()))
            .buffered(jobs)
            .collect::<Vec<_>>()
            .await;

        RunSummary {
            outcomes,
            policy: self.options.policy,
        }
    }

    async fn process(&self, target: &dyn Processor) -> TargetOutcome {
        let state = self.drive(target).await;

        match &state {
            TargetState::Failed(failure) => {
                warn!("{}", failure);
                if self.options.policy == FailurePolicy::FailFast {
                    self.cancel.cancel();
                }
            }
            TargetState::Delivered { detail, .. } => info!("{}: {}", target.name(), detail),
            TargetState::Skipped(reason) => debug!("{}: skipped ({})", target.name(), reason),
        }

        TargetOutcome {
            target: target.name().to_string(),
            kind: target.kind(),
            state,
        }
    }

    async fn drive(&self, target: &dyn Processor) -> TargetState {
        let name = target.name();
        let failed = |stage, error| {
            TargetState::Failed(TargetFailure {
                target: name.to_string(),
                stage,
                error,
            })
        };

        if !self.options.is_selected(name) {
            return TargetState::Skipped(SkipReason::NotSelected);
        }
        if !target.is_enabled() {
            if self.options.is_requested(name) {
                return failed(
                    Stage::Context,
                    StageError::configuration(format!("{} was requested but is disabled", name)),
                );
            }
            return TargetState::Skipped(SkipReason::Disabled);
        }
        if self.cancel.is_cancelled() {
            return TargetState::Skipped(SkipReason::Cancelled);
        }

        let context = match target.build_context(self.model) {
            Ok(context) => context,
            Err(e) => return failed(Stage::Context, e),
        };
        debug!("{}: context built ({} keys)", name, context.len());

        let rendered = match target.render(self.engine, &context) {
            Ok(rendered) => rendered,
            Err(e) => return failed(Stage::Render, e),
        };

        match target.deliver(rendered, &self.options.delivery()).await {
            Ok(delivery) => TargetState::Delivered {
                simulated: delivery.simulated,
                detail: delivery.detail,
            },
            Err(e) => failed(Stage::Deliver, e),
        }
    }
}

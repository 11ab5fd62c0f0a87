//! Display formatting for CLI output

use console::style;
use herald_publish::{RunSummary, StageError, TargetOutcome, TargetState};

/// Width of the target name column
const NAME_WIDTH: usize = 8;

/// Print one line per target, then totals
pub fn print_summary(summary: &RunSummary) {
    println!();
    for outcome in &summary.outcomes {
        print_outcome(outcome);
    }

    let failed = summary.failures().count();
    println!();
    let totals = format!(
        "{} delivered, {} skipped, {} failed",
        summary.delivered(),
        summary.skipped(),
        failed
    );
    if failed == 0 {
        println!("{} {}", style("✓").green().bold(), totals);
    } else if summary.is_failure() {
        println!("{} {}", style("✗").red().bold(), totals);
    } else {
        println!("{} {} (best effort)", style("⚠").yellow().bold(), totals);
    }
}

fn print_outcome(outcome: &TargetOutcome) {
    let name = format!("{:<width$}", outcome.target, width = NAME_WIDTH);

    match &outcome.state {
        TargetState::Delivered { simulated, detail } => {
            let label = if *simulated { "dry-run" } else { "delivered" };
            println!(
                "  {} {} {} {}",
                style("✓").green(),
                style(name).bold(),
                label,
                style(detail).dim()
            );
        }
        TargetState::Skipped(reason) => {
            println!(
                "  {} {} skipped ({})",
                style("○").dim(),
                style(name).dim(),
                reason
            );
        }
        TargetState::Failed(failure) => {
            println!(
                "  {} {} failed during {}: {}",
                style("✗").red(),
                style(name).bold(),
                failure.stage,
                failure.error
            );
            if let StageError::Template { source, .. } = &failure.error {
                if let Some(suggestion) = &source.suggestion {
                    println!("    {} {}", style("hint:").blue(), suggestion);
                }
            }
        }
    }
}

//! Config command - show the resolved configuration, credentials masked

use console::style;
use herald_publish::registry;
use std::path::Path;

use super::load_config;
use crate::error::Result;

pub fn run(path: &Path, yaml: bool) -> Result<()> {
    let config = load_config(path)?;

    if yaml {
        // Secrets serialize as their masked marker
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let project = config.resolve_project()?;
    let repository = config.release.repository()?;

    println!(
        "{} Configuration from {}",
        style("→").blue(),
        path.display()
    );
    println!();
    println!("{}", style("Project").cyan().bold());
    println!("  name: {}", project.name);
    println!("  version: {}", project.version);
    if project.snapshot {
        println!("  effective version: {}", project.effective_version);
    }
    println!("  release: {} {}", repository.kind, repository.url());
    println!(
        "  distribution: {} ({} artifact(s))",
        config.distribution_name(),
        config.distribution.artifacts.len()
    );

    for target in registry(&config) {
        println!();
        let marker = if target.is_enabled() {
            style("●").green()
        } else {
            style("○").dim()
        };
        println!(
            "{} {} {}",
            marker,
            style(target.name()).cyan().bold(),
            style(format!("({})", target.kind())).dim()
        );
        for (key, value) in target.describe() {
            println!("  {}: {}", key, value);
        }
    }

    Ok(())
}

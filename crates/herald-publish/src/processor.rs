//! The capability set every packaging tool and announcer implements
//!
//! A target is driven through three strictly sequential stages: build its
//! context, render its output, deliver it. Implementations share no mutable
//! state, so targets can be processed independently.

use async_trait::async_trait;
use herald_core::{HeraldConfig, ReleaseContext, ReleaseModel};
use herald_engine::Engine;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

use crate::announce::{SdkmanAnnouncer, ZulipAnnouncer};
use crate::error::StageError;
use crate::tools::ScoopProcessor;

/// Whether a target produces files or sends messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Tool,
    Announcer,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tool => write!(f, "packager"),
            Self::Announcer => write!(f, "announcer"),
        }
    }
}

/// A rendered file, relative to the output root
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestFile {
    pub path: PathBuf,
    pub content: String,
}

/// A rendered announcement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub channel: String,
    pub subject: String,
    pub body: String,
    /// Extra URL for services that announce a link separately from the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Output of the render stage
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Files(Vec<ManifestFile>),
    Message(Message),
}

/// Settings shared by every delivery in a run
#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    pub output_dir: PathBuf,
    pub dry_run: bool,
}

/// Result of a successful delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// True when a dry run suppressed the side effect
    pub simulated: bool,
    pub detail: String,
}

/// One packaging tool or announcement channel
#[async_trait]
pub trait Processor: Send + Sync {
    /// Stable target name (`scoop`, `zulip`, ...)
    fn name(&self) -> &str;

    fn kind(&self) -> TargetKind;

    fn is_enabled(&self) -> bool;

    /// Settings for diagnostics, with credentials masked
    fn describe(&self) -> IndexMap<String, String>;

    /// Assemble this target's context from the release model
    fn build_context(&self, model: &ReleaseModel) -> Result<ReleaseContext, StageError>;

    /// Render the target's output against its context
    fn render(&self, engine: &Engine, context: &ReleaseContext) -> Result<Rendered, StageError>;

    /// Perform the side effect: write files or send the message
    async fn deliver(
        &self,
        rendered: Rendered,
        options: &DeliveryOptions,
    ) -> Result<Delivery, StageError>;
}

/// Packaging tools, in processing order
pub fn tools(config: &HeraldConfig) -> Vec<Box<dyn Processor>> {
    vec![Box::new(ScoopProcessor::new(
        config.packagers.scoop.clone(),
        config.base_dir.clone(),
    ))]
}

/// Announcers, in processing order
pub fn announcers(config: &HeraldConfig) -> Vec<Box<dyn Processor>> {
    vec![
        Box::new(ZulipAnnouncer::new(config.announce.zulip.clone())),
        Box::new(SdkmanAnnouncer::new(config.announce.sdkman.clone())),
    ]
}

/// Every target: tools first, then announcers
pub fn registry(config: &HeraldConfig) -> Vec<Box<dyn Processor>> {
    let mut targets = tools(config);
    targets.extend(announcers(config));
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
project: { name: app, version: 1.0.0 }
release:
  github: { owner: acme, name: app }
packagers:
  scoop: { enabled: true }
"#;

    #[test]
    fn test_registry_order() {
        let config = HeraldConfig::from_yaml(CONFIG).unwrap();
        let names: Vec<String> = registry(&config)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["scoop", "zulip", "sdkman"]);
    }

    #[test]
    fn test_registry_kinds_and_enablement() {
        let config = HeraldConfig::from_yaml(CONFIG).unwrap();
        let targets = registry(&config);

        assert_eq!(targets[0].kind(), TargetKind::Tool);
        assert!(targets[0].is_enabled());
        assert_eq!(targets[1].kind(), TargetKind::Announcer);
        assert!(!targets[1].is_enabled());
        assert!(!targets[2].is_enabled());
    }
}

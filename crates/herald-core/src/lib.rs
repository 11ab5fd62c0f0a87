//! Herald Core - Core types and utilities for release packaging and announcements
//!
//! This crate provides the foundational types used throughout Herald:
//! - `ReleaseModel`: Project, release and distribution facts for one run
//! - `ReleaseContext`: Layered, ordered property context fed to templates
//! - `Secret`: Credential values that never print their raw contents
//! - `rewrite`: Version placeholder rewriting for self-updating manifests
//! - `HeraldConfig`: The YAML release configuration

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod model;
pub mod rewrite;

pub use config::{HeraldConfig, RunConfig, ScoopConfig, SdkmanConfig, ZulipConfig};
pub use context::{ContextBuilder, Layer, ReleaseContext, Scalar, keys};
pub use credentials::{Secret, resolve};
pub use error::{CoreError, Result};
pub use model::{Artifact, Distribution, GitHost, Project, ReleaseInfo, ReleaseModel, Repository};
pub use rewrite::{VERSION_PLACEHOLDER, rewrite_for_autoupdate, rewrite_value};

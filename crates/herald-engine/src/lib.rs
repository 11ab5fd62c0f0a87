//! Herald Engine - Jinja2 templating for package manifests and announcements
//!
//! This crate wraps MiniJinja behind a small contract:
//! - `Engine::render` always evaluates a template against a `ReleaseContext`
//! - `Engine::render_field` only evaluates values that contain template syntax
//! - Undefined context keys are errors, never empty strings
//! - Template errors carry source spans and closest-key suggestions

pub mod engine;
pub mod error;
pub mod filters;
pub mod suggestions;

pub use engine::{Engine, has_template_syntax};
pub use error::{EngineError, Result, TemplateError, TemplateErrorKind};
pub use suggestions::AVAILABLE_FILTERS;

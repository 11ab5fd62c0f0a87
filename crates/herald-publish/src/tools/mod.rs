//! Packaging tool processors

mod scoop;

pub use scoop::ScoopProcessor;

use herald_core::{ReleaseContext, rewrite_for_autoupdate, rewrite_value};
use herald_engine::{Engine, has_template_syntax};

use crate::error::StageError;

/// Resolve a field that must stay valid for releases after this one.
///
/// A literal value is rewritten directly. A template is rendered against the
/// concrete context first, then every occurrence of `version` in the result
/// is replaced by `token`. Should the output still carry template syntax
/// (a context value that was itself a template), it is rendered once more
/// against the token-bearing context.
pub fn resolve_self_updating(
    engine: &Engine,
    raw: &str,
    context: &ReleaseContext,
    version: &str,
    token: &str,
    field: &str,
) -> Result<String, StageError> {
    if !has_template_syntax(raw) {
        return Ok(rewrite_value(raw, version, token));
    }

    let rendered = engine
        .render_field(raw, context, field)
        .map_err(|e| StageError::template(field, e))?;
    let rewritten = rewrite_value(&rendered, version, token);

    if !has_template_syntax(&rewritten) {
        return Ok(rewritten);
    }

    let derived = rewrite_for_autoupdate(context, version, token);
    engine
        .render_field(&rewritten, &derived, field)
        .map_err(|e| StageError::template(field, e))
}

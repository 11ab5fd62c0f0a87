//! Version placeholder rewriting
//!
//! Self-updating package manifests (Scoop's `autoupdate` block, for example)
//! must embed URLs and paths that stay valid for future releases. The
//! package manager substitutes a placeholder token such as `$version` with the
//! version it discovers, so every occurrence of the concrete version has to
//! be replaced by that token before the value lands in the manifest.
//!
//! Matching is literal substring replacement. A value that merely contains
//! the version string by coincidence (a build number equal to the version,
//! say) is rewritten as well.

use crate::context::{ReleaseContext, Scalar, keys};

/// Placeholder understood by Scoop's checkver/autoupdate machinery
pub const VERSION_PLACEHOLDER: &str = "$version";

/// Keys whose values may embed the concrete version
pub const VERSION_BEARING_KEYS: &[&str] = &[
    keys::ARTIFACT_FILE,
    keys::ARTIFACT_FILE_NAME,
    keys::TAG_NAME,
    keys::PROJECT_VERSION,
    keys::PROJECT_EFFECTIVE_VERSION,
];

/// Replace every occurrence of `version` in `value` with `token`
pub fn rewrite_value(value: &str, version: &str, token: &str) -> String {
    if version.is_empty() {
        return value.to_string();
    }
    value.replace(version, token)
}

/// Derive a context whose version-bearing values use `token` instead of `version`.
///
/// The project version keys are set to `token` outright when present. Keys
/// outside [`VERSION_BEARING_KEYS`] and non-string values pass through.
pub fn rewrite_for_autoupdate(context: &ReleaseContext, version: &str, token: &str) -> ReleaseContext {
    if version.is_empty() {
        return context.clone();
    }

    let mut derived = context.clone();
    for key in VERSION_BEARING_KEYS {
        if let Some(Scalar::String(value)) = context.get(key) {
            if value.contains(version) {
                derived = derived.with(key, rewrite_value(value, version, token));
            }
        }
    }

    for key in [keys::PROJECT_VERSION, keys::PROJECT_EFFECTIVE_VERSION] {
        if context.contains_key(key) {
            derived = derived.with(key, token);
        }
    }

    derived
}

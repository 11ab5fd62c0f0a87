//! Credential resolution with environment fallback
//!
//! Every secret a target needs (API keys, consumer tokens) is resolved the
//! same way: an explicit, non-blank value from the configuration wins,
//! otherwise the named process environment variable is consulted. Absence is
//! a normal outcome; callers decide whether it is fatal.
//!
//! Resolved values are wrapped in [`Secret`], whose `Debug`, `Display` and
//! `Serialize` implementations only ever emit a masked marker.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CoreError, Result};

/// Marker shown in place of a credential that has a value
pub const MASKED: &str = "************";

/// Marker shown in place of a credential that has no value
pub const UNSET: &str = "**unset**";

/// Resolve a credential from an explicit value, falling back to `env_var`
pub fn resolve(explicit: Option<&str>, env_var: &str) -> Option<String> {
    resolve_with(explicit, env_var, |name| std::env::var(name).ok())
}

/// Same as [`resolve`], with an injectable environment lookup
pub fn resolve_with<F>(explicit: Option<&str>, env_var: &str, lookup: F) -> Option<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    if let Some(value) = explicit.filter(|v| is_not_blank(v)) {
        return Some(value.to_string());
    }

    lookup(env_var).filter(|v| is_not_blank(v))
}

fn is_not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// A secret string that never exposes its raw value through formatting
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(Option<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn unset() -> Self {
        Self(None)
    }

    /// Whether a non-blank value is present
    pub fn is_set(&self) -> bool {
        self.0.as_deref().is_some_and(is_not_blank)
    }

    /// The masked marker for diagnostics
    pub fn masked(&self) -> &'static str {
        if self.is_set() { MASKED } else { UNSET }
    }

    /// Borrow the raw value. Only call this at the point of use (HTTP headers).
    pub fn expose(&self) -> Option<&str> {
        self.0.as_deref().filter(|v| is_not_blank(v))
    }

    /// Resolve against the environment, recomputed on every call
    pub fn resolve(&self, env_var: &str) -> Secret {
        Secret(resolve(self.0.as_deref(), env_var))
    }

    /// Resolve and fail when neither the explicit value nor `env_var` is set
    pub fn require(&self, name: &str, env_var: &str) -> Result<Secret> {
        let resolved = self.resolve(env_var);
        if resolved.is_set() {
            Ok(resolved)
        } else {
            Err(CoreError::MissingCredential {
                name: name.to_string(),
                env_var: env_var.to_string(),
            })
        }
    }
}

impl From<Option<String>> for Secret {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", self.masked())
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.masked())
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.masked())
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(Secret)
    }
}

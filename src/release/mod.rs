//! Release identity: how the version and the creation payload are obtained.
//!
//! Both can be literal values or derivation rules. They are resolved once per
//! `after-emit` invocation into a [`ReleaseContext`]; the configured options are
//! never overwritten.

use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Derives a release version from the build hash
pub type VersionFn = dyn Fn(&str) -> String + Send + Sync;

/// Derives the release creation payload from the resolved version and project slugs
pub type BodyFn = dyn Fn(&str, &[String]) -> Value + Send + Sync;

/// Release version, either fixed or computed from the build hash
#[derive(Clone)]
pub enum ReleaseVersion {
    /// Fixed version string
    Literal(String),
    /// Computed from the build hash
    Derived(Arc<VersionFn>),
}

impl ReleaseVersion {
    /// Wrap a derivation rule
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    /// Parse a configured string. `[hash]` placeholders make the version derived.
    pub fn from_template(template: &str) -> Self {
        if template.contains(HASH_PLACEHOLDER) {
            let template = template.to_string();
            Self::derived(move |hash| template.replace(HASH_PLACEHOLDER, hash))
        } else {
            Self::Literal(template.to_string())
        }
    }

    /// Whether a value is configured at all. Derived versions always count.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Literal(v) => !v.is_empty(),
            Self::Derived(_) => true,
        }
    }

    /// Resolve against a build hash
    pub fn resolve(&self, hash: &str) -> String {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Derived(f) => f(hash),
        }
    }
}

impl fmt::Debug for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

impl From<&str> for ReleaseVersion {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for ReleaseVersion {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

/// Placeholder substituted with the build hash in templated versions
pub const HASH_PLACEHOLDER: &str = "[hash]";

/// Payload sent when creating the release
#[derive(Clone)]
pub enum ReleaseBody {
    /// Fixed JSON payload
    Literal(Value),
    /// Computed from the resolved version and project slugs
    Derived(Arc<BodyFn>),
}

impl ReleaseBody {
    /// Wrap a derivation rule
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&str, &[String]) -> Value + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    /// Resolve against the release version and project slugs
    pub fn resolve(&self, version: &str, projects: &[String]) -> Value {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Derived(f) => f(version, projects),
        }
    }
}

impl Default for ReleaseBody {
    fn default() -> Self {
        Self::derived(default_body)
    }
}

impl fmt::Debug for ReleaseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

/// `{"version": ..., "projects": [...]}`
pub fn default_body(version: &str, projects: &[String]) -> Value {
    json!({
        "version": version,
        "projects": projects,
    })
}

/// Version and body resolved for a single build
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseContext {
    /// Resolved release version
    pub version: String,
    /// Resolved creation payload
    pub body: Value,
}

impl ReleaseContext {
    /// Resolve version first, then the body from it
    pub fn resolve(
        version: &ReleaseVersion,
        body: &ReleaseBody,
        projects: &[String],
        hash: &str,
    ) -> Self {
        let version = version.resolve(hash);
        let body = body.resolve(&version, projects);
        Self { version, body }
    }
}

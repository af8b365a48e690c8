//! Uploader configuration with defaults applied at construction time.

mod file;

pub use file::{ProjectSlugs, RawOptions, load_config_file};

use crate::error::{RequiredOption, Result};
use crate::release::{ReleaseBody, ReleaseVersion};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Default Sentry API root
pub const DEFAULT_BASE_SENTRY_URL: &str = "https://sentry.io/api/0";

/// Default upload selection: scripts and source maps
pub const DEFAULT_INCLUDE: &str = r"\.js$|\.map$";

/// Default cleanup selection: source maps
pub const DEFAULT_DELETE_REGEX: &str = r"\.map$";

/// Trailing segment of the pre-organizations API layout
const DEPRECATED_URL_SUFFIX: &str = "/projects";

/// Maps an asset name to the artifact name sent to Sentry
#[derive(Clone)]
pub struct FilenameTransform(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl FilenameTransform {
    /// Wrap a transform function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Apply the transform
    pub fn apply(&self, name: &str) -> String {
        (self.0)(name)
    }
}

impl Default for FilenameTransform {
    fn default() -> Self {
        Self::new(|name| format!("~/{name}"))
    }
}

impl fmt::Debug for FilenameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FilenameTransform(<fn>)")
    }
}

/// URL layout used to address releases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UrlScheme {
    /// `{base}/organizations/{org}/releases/`
    #[default]
    Organizations,
    /// `{base}/projects/{org}/{project}/releases/`, scoped to the first project
    ProjectScoped,
}

/// Configuration for the release uploader
#[derive(Debug, Clone)]
pub struct UploaderOptions {
    /// Organization slug
    pub organization: Option<String>,
    /// Project slugs; a single slug is stored as a one-element list
    pub projects: Vec<String>,
    /// Bearer token for the Sentry API
    pub api_key: Option<String>,
    /// API root, already normalized
    pub base_sentry_url: String,
    /// URL layout for release endpoints
    pub url_scheme: UrlScheme,
    /// Release version, literal or derived from the build hash
    pub release: Option<ReleaseVersion>,
    /// Release creation payload
    pub release_body: ReleaseBody,
    /// Assets to upload; `None` selects every asset
    pub include: Option<Regex>,
    /// Assets never uploaded
    pub exclude: Option<Regex>,
    /// Asset name -> artifact name
    pub filename_transform: FilenameTransform,
    /// Downgrade every failure to a build warning
    pub suppress_errors: bool,
    /// Downgrade 409 conflicts to a build warning
    pub suppress_conflict_error: bool,
    /// Delete existing release artifacts before uploading
    pub should_overwrite: bool,
    /// Remove matching build outputs once the build is done
    pub delete_after_compile: bool,
    /// Assets removed by post-build cleanup
    pub delete_regex: Regex,
}

impl Default for UploaderOptions {
    fn default() -> Self {
        Self {
            organization: None,
            projects: Vec::new(),
            api_key: None,
            base_sentry_url: DEFAULT_BASE_SENTRY_URL.to_string(),
            url_scheme: UrlScheme::default(),
            release: None,
            release_body: ReleaseBody::default(),
            include: Some(default_regex(DEFAULT_INCLUDE)),
            exclude: None,
            filename_transform: FilenameTransform::default(),
            suppress_errors: false,
            suppress_conflict_error: false,
            should_overwrite: false,
            delete_after_compile: false,
            delete_regex: default_regex(DEFAULT_DELETE_REGEX),
        }
    }
}

// Built-in patterns are constants; covered by test_defaults.
fn default_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern is valid")
}

impl UploaderOptions {
    /// Create options with every default applied
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the organization slug
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set a single project slug
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.projects = vec![project.into()];
        self
    }

    /// Set several project slugs, preserving order
    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API root, normalizing the deprecated `/projects` form
    pub fn with_base_sentry_url(mut self, url: &str) -> Self {
        self.base_sentry_url = normalize_base_url(url);
        self
    }

    /// Select the URL layout
    pub fn with_url_scheme(mut self, scheme: UrlScheme) -> Self {
        self.url_scheme = scheme;
        self
    }

    /// Set the release version
    pub fn with_release(mut self, release: impl Into<ReleaseVersion>) -> Self {
        self.release = Some(release.into());
        self
    }

    /// Set the release creation payload
    pub fn with_release_body(mut self, body: ReleaseBody) -> Self {
        self.release_body = body;
        self
    }

    /// Set the include pattern, or `None` to select every asset
    pub fn with_include(mut self, include: Option<Regex>) -> Self {
        self.include = include;
        self
    }

    /// Set the exclude pattern
    pub fn with_exclude(mut self, exclude: Option<Regex>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set the artifact name transform
    pub fn with_filename_transform(mut self, transform: FilenameTransform) -> Self {
        self.filename_transform = transform;
        self
    }

    /// Downgrade all failures to warnings
    pub fn with_suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    /// Downgrade 409 conflicts to warnings
    pub fn with_suppress_conflict_error(mut self, suppress: bool) -> Self {
        self.suppress_conflict_error = suppress;
        self
    }

    /// Delete existing artifacts before uploading
    pub fn with_should_overwrite(mut self, overwrite: bool) -> Self {
        self.should_overwrite = overwrite;
        self
    }

    /// Enable post-build cleanup
    pub fn with_delete_after_compile(mut self, delete: bool) -> Self {
        self.delete_after_compile = delete;
        self
    }

    /// Set the cleanup pattern
    pub fn with_delete_regex(mut self, regex: Regex) -> Self {
        self.delete_regex = regex;
        self
    }

    /// Check required options in fixed order and return the first one missing.
    ///
    /// On success returns the configured release version.
    ///
    /// Derived release versions count as present; an empty result is caught
    /// after resolution.
    pub fn validate(&self) -> Result<&ReleaseVersion> {
        if is_blank(self.organization.as_deref()) {
            return Err(RequiredOption::Organization.into());
        }
        if self.projects.iter().all(|p| p.is_empty()) {
            return Err(RequiredOption::Project.into());
        }
        if is_blank(self.api_key.as_deref()) {
            return Err(RequiredOption::ApiKey.into());
        }
        self.release
            .as_ref()
            .filter(|release| release.is_present())
            .ok_or_else(|| RequiredOption::ReleaseVersion.into())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

/// Strip trailing slashes and the deprecated `/projects` suffix.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    match trimmed.strip_suffix(DEPRECATED_URL_SUFFIX) {
        Some(stripped) => {
            log::warn!(
                "baseSentryURL ending in '{}' is deprecated; use '{}' instead",
                DEPRECATED_URL_SUFFIX,
                stripped
            );
            stripped.to_string()
        }
        None => trimmed.to_string(),
    }
}

//! TOML configuration file support.
//!
//! Recognizes the plugin's option names verbatim (`apiKey`, `baseSentryURL`,
//! ...). `filenameTransform` is code, not data, so it can only be set through
//! [`UploaderOptions`] directly.

use super::{UploaderOptions, normalize_base_url};
use crate::error::{ConfigError, Result};
use crate::release::{ReleaseBody, ReleaseVersion};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// One project slug or several
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProjectSlugs {
    /// A single slug
    One(String),
    /// Ordered list of slugs
    Many(Vec<String>),
}

impl ProjectSlugs {
    /// Coerce into an ordered list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ProjectSlugs::One(slug) => vec![slug],
            ProjectSlugs::Many(slugs) => slugs,
        }
    }
}

/// Options as written in a config file, before defaults are applied
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOptions {
    /// Organization slug
    #[serde(alias = "organisation")]
    pub organization: Option<String>,
    /// Project slug(s)
    pub project: Option<ProjectSlugs>,
    /// API key
    pub api_key: Option<String>,
    /// API root
    #[serde(rename = "baseSentryURL")]
    pub base_sentry_url: Option<String>,
    /// Release version; `[hash]` is replaced with the build hash
    pub release: Option<String>,
    /// Literal release creation payload
    pub release_body: Option<toml::Table>,
    /// Include pattern
    pub include: Option<String>,
    /// Exclude pattern
    pub exclude: Option<String>,
    /// Downgrade all failures to warnings
    pub suppress_errors: Option<bool>,
    /// Downgrade 409 conflicts to warnings
    pub suppress_conflict_error: Option<bool>,
    /// Delete existing artifacts before uploading
    pub should_overwrite: Option<bool>,
    /// Remove matching build outputs once the build is done
    pub delete_after_compile: Option<bool>,
    /// Cleanup pattern
    pub delete_regex: Option<String>,
}

impl RawOptions {
    /// Parse options from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Fill every unset field in `self` from `other`
    pub fn or(self, other: RawOptions) -> Self {
        Self {
            organization: self.organization.or(other.organization),
            project: self.project.or(other.project),
            api_key: self.api_key.or(other.api_key),
            base_sentry_url: self.base_sentry_url.or(other.base_sentry_url),
            release: self.release.or(other.release),
            release_body: self.release_body.or(other.release_body),
            include: self.include.or(other.include),
            exclude: self.exclude.or(other.exclude),
            suppress_errors: self.suppress_errors.or(other.suppress_errors),
            suppress_conflict_error: self.suppress_conflict_error.or(other.suppress_conflict_error),
            should_overwrite: self.should_overwrite.or(other.should_overwrite),
            delete_after_compile: self.delete_after_compile.or(other.delete_after_compile),
            delete_regex: self.delete_regex.or(other.delete_regex),
        }
    }

    /// Apply defaults and compile patterns
    pub fn into_options(self) -> Result<UploaderOptions> {
        let mut options = UploaderOptions::default();

        options.organization = self.organization;
        options.projects = self.project.map(ProjectSlugs::into_vec).unwrap_or_default();
        options.api_key = self.api_key;
        if let Some(url) = self.base_sentry_url {
            options.base_sentry_url = normalize_base_url(&url);
        }
        options.release = self.release.as_deref().map(ReleaseVersion::from_template);
        if let Some(table) = self.release_body {
            options.release_body = ReleaseBody::Literal(serde_json::to_value(table)?);
        }
        if let Some(pattern) = self.include {
            options.include = Some(Regex::new(&pattern)?);
        }
        if let Some(pattern) = self.exclude {
            options.exclude = Some(Regex::new(&pattern)?);
        }
        if let Some(pattern) = self.delete_regex {
            options.delete_regex = Regex::new(&pattern)?;
        }
        options.suppress_errors = self.suppress_errors.unwrap_or_default();
        options.suppress_conflict_error = self.suppress_conflict_error.unwrap_or_default();
        options.should_overwrite = self.should_overwrite.unwrap_or_default();
        options.delete_after_compile = self.delete_after_compile.unwrap_or_default();

        Ok(options)
    }
}

/// Load options from a TOML file
pub fn load_config_file(path: &Path) -> Result<RawOptions> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded config from {}", path.display());
    RawOptions::from_toml(&content, path)
}

//! The release uploader and the host build-tool hook contract.
//!
//! A host calls [`BuildPlugin::after_emit`] once per successful compilation and
//! [`BuildPlugin::done`] once the whole build has finished. `after_emit` never
//! fails: its future resolving is the completion signal, and every failure has
//! already been pushed onto the compilation's errors or warnings by then.
//!
//! ```no_run
//! use sentry_release_uploader::{BuildPlugin, Compilation, EmittedAsset, ReleaseUploader, UploaderOptions};
//!
//! # async fn run() -> sentry_release_uploader::Result<()> {
//! let uploader = ReleaseUploader::new(
//!     UploaderOptions::new()
//!         .with_organization("acme")
//!         .with_project("web")
//!         .with_api_key("token")
//!         .with_release("v1.0.0"),
//! )?;
//!
//! let mut compilation = Compilation::new(
//!     "a1b2c3",
//!     vec![EmittedAsset::new("app.js", "dist/app.js")],
//! );
//! uploader.after_emit(&mut compilation).await;
//! uploader.done(&compilation.stats())?;
//! # Ok(())
//! # }
//! ```

mod cleanup;
mod report;

pub use cleanup::delete_matching;
pub use report::{ErrorReport, MESSAGE_PREFIX, SuppressionPolicy};

use crate::build::{BuildStats, Compilation, FileFilter, UploadFile};
use crate::config::UploaderOptions;
use crate::error::{RequiredOption, Result};
use crate::release::ReleaseContext;
use crate::sentry::{ReleaseScope, SentryApi};
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;

/// Lifecycle events a plugin attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// After a compilation emitted its assets
    AfterEmit,
    /// After the whole build finished
    Done,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPoint::AfterEmit => f.write_str("after-emit"),
            HookPoint::Done => f.write_str("done"),
        }
    }
}

/// Hooks a host build tool invokes on a plugin
pub trait BuildPlugin {
    /// Runs after a compilation emitted its assets. Resolves exactly once.
    fn after_emit(&self, compilation: &mut Compilation) -> impl Future<Output = ()> + Send;

    /// Runs once the build is done; returns the files it removed
    fn done(&self, stats: &BuildStats) -> Result<Vec<PathBuf>>;
}

/// What a successful `after-emit` run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Resolved release version
    pub version: String,
    /// Number of artifacts uploaded
    pub uploaded: usize,
    /// Number of pre-existing artifacts deleted
    pub deleted: usize,
}

/// Creates a Sentry release per build and uploads the selected assets to it
#[derive(Debug, Clone)]
pub struct ReleaseUploader {
    options: UploaderOptions,
    client: Client,
}

impl ReleaseUploader {
    /// Create an uploader with its own HTTP client
    pub fn new(options: UploaderOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { options, client })
    }

    /// Create an uploader sharing an existing HTTP client
    pub fn with_client(options: UploaderOptions, client: Client) -> Self {
        Self { options, client }
    }

    /// Configured options
    pub fn options(&self) -> &UploaderOptions {
        &self.options
    }

    /// Error suppression derived from the options
    pub fn suppression(&self) -> SuppressionPolicy {
        SuppressionPolicy {
            suppress_errors: self.options.suppress_errors,
            suppress_conflict_error: self.options.suppress_conflict_error,
        }
    }

    /// Assets of `compilation` that will be uploaded, in emission order
    pub fn select_files(&self, compilation: &Compilation) -> Vec<UploadFile> {
        FileFilter::new(self.options.include.as_ref(), self.options.exclude.as_ref())
            .select(&compilation.assets)
    }

    /// Run the full release flow for one compilation.
    ///
    /// validate, select, resolve, create release, optionally replace existing
    /// artifacts, upload. Nothing touches the network before validation passes.
    pub async fn publish(&self, compilation: &Compilation) -> Result<PublishOutcome> {
        let release = self.options.validate()?;

        let files = self.select_files(compilation);

        let context = ReleaseContext::resolve(
            release,
            &self.options.release_body,
            &self.options.projects,
            &compilation.hash,
        );
        if context.version.is_empty() {
            return Err(RequiredOption::ReleaseVersion.into());
        }

        let api = self.api()?;

        log::info!("Creating release {}", context.version);
        api.create_release(&context.body).await?;

        let mut deleted = 0;
        if self.options.should_overwrite {
            let existing = api.list_artifacts(&context.version).await?;
            deleted = api.delete_artifacts(&context.version, &existing).await?;
            log::info!(
                "Deleted {} of {} existing artifact(s)",
                deleted,
                existing.len()
            );
        }

        let uploads: Vec<(UploadFile, String)> = files
            .into_iter()
            .map(|file| {
                let name = self.options.filename_transform.apply(&file.name);
                (file, name)
            })
            .collect();
        let uploaded = api.upload_artifacts(&context.version, &uploads).await?;
        log::info!("Uploaded {} artifact(s) to {}", uploaded, context.version);

        Ok(PublishOutcome {
            version: context.version,
            uploaded,
            deleted,
        })
    }

    fn api(&self) -> Result<SentryApi> {
        let organization = self
            .options
            .organization
            .clone()
            .ok_or(RequiredOption::Organization)?;
        let project = self
            .options
            .projects
            .iter()
            .find(|p| !p.is_empty())
            .cloned()
            .ok_or(RequiredOption::Project)?;
        let api_key = self
            .options
            .api_key
            .as_deref()
            .ok_or(RequiredOption::ApiKey)?;

        SentryApi::new(
            self.client.clone(),
            &self.options.base_sentry_url,
            api_key,
            ReleaseScope {
                organization,
                project,
                scheme: self.options.url_scheme,
            },
        )
    }
}

impl BuildPlugin for ReleaseUploader {
    async fn after_emit(&self, compilation: &mut Compilation) {
        log::debug!("{} hook for build {}", HookPoint::AfterEmit, compilation.hash);

        match self.publish(compilation).await {
            Ok(outcome) => log::info!(
                "Release {} ready: {} uploaded, {} replaced",
                outcome.version,
                outcome.uploaded,
                outcome.deleted
            ),
            Err(error) => {
                self.suppression().route(&error, compilation);
            }
        }
    }

    fn done(&self, stats: &BuildStats) -> Result<Vec<PathBuf>> {
        if !self.options.delete_after_compile {
            return Ok(Vec::new());
        }
        log::debug!("{} hook for build {}", HookPoint::Done, stats.hash);
        delete_matching(stats, &self.options.delete_regex)
    }
}

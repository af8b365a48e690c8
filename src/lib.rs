//! # Sentry Release Uploader
//!
//! Build-pipeline hook that publishes a Sentry release for every build.
//!
//! After a compilation emits its assets, the uploader creates the release,
//! optionally clears artifacts already attached to it, and uploads the selected
//! assets (scripts and source maps by default). Once the build is done it can
//! remove matching outputs, typically source maps, from disk.
//!
//! ## Features
//!
//! - **Literal or derived release identity**: versions and payloads can be
//!   computed from the build hash, resolved once per build
//! - **Overwrite mode**: replace the artifacts of an existing release
//! - **Non-blocking failures**: errors land in the compilation's collectors,
//!   optionally downgraded to warnings
//! - **Post-build cleanup**: delete source maps after they are uploaded
//!
//! ## Usage
//!
//! ```bash
//! sentry_release_uploader upload --output-dir dist --release "web@[hash]"
//! sentry_release_uploader validate --config sentry-release.toml
//! sentry_release_uploader cleanup --output-dir dist
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod plugin;
pub mod release;
pub mod sentry;

// Re-export main types for public API
pub use build::{BuildStats, Compilation, EmittedAsset, FileFilter, UploadFile};
pub use cli::Args;
pub use config::{FilenameTransform, RawOptions, UploaderOptions, UrlScheme};
pub use error::{ConfigError, RequiredOption, Result, UploaderError};
pub use plugin::{BuildPlugin, ErrorReport, HookPoint, PublishOutcome, ReleaseUploader};
pub use release::{ReleaseBody, ReleaseContext, ReleaseVersion};
pub use sentry::{Artifact, SentryApi};

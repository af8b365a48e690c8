//! Command line argument parsing and validation.
//!
//! The binary stands in for a host build tool: it turns an output directory
//! into a compilation and drives the uploader's hooks against it.

use crate::config::{ProjectSlugs, RawOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "sentry-release.toml";

/// Publish Sentry releases from build output
#[derive(Parser, Debug)]
#[command(
    name = "sentry_release_uploader",
    version,
    about = "Publish Sentry releases from build output",
    long_about = "Create a Sentry release for a build and upload its scripts and source maps.

Usage:
  sentry_release_uploader upload --output-dir dist --release v1.0.0
  sentry_release_uploader upload --release 'web@[hash]' --overwrite
  sentry_release_uploader validate --config sentry-release.toml
  sentry_release_uploader cleanup --output-dir dist"
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Config file (TOML)
    #[arg(long, short, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Only print errors
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the release and upload build artifacts, then run post-build cleanup
    Upload {
        /// Build output directory
        #[arg(long, short, value_name = "DIR", default_value = "dist")]
        output_dir: PathBuf,

        /// Build hash; computed from the output when omitted
        #[arg(long)]
        hash: Option<String>,

        /// Option overrides
        #[command(flatten)]
        overrides: OptionOverrides,
    },

    /// Check configuration without contacting Sentry
    Validate {
        /// Option overrides
        #[command(flatten)]
        overrides: OptionOverrides,
    },

    /// Delete build outputs matching deleteRegex
    Cleanup {
        /// Build output directory
        #[arg(long, short, value_name = "DIR", default_value = "dist")]
        output_dir: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl Command {
    /// Subcommand name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Upload { .. } => "upload",
            Command::Validate { .. } => "validate",
            Command::Cleanup { .. } => "cleanup",
        }
    }
}

/// Options that can be given on the command line or through the environment
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OptionOverrides {
    /// Organization slug
    #[arg(long = "org", env = "SENTRY_ORG")]
    pub organization: Option<String>,

    /// Project slug; repeat or comma-separate for several
    #[arg(long, env = "SENTRY_PROJECT", value_delimiter = ',')]
    pub project: Vec<String>,

    /// API key
    #[arg(long, env = "SENTRY_AUTH_TOKEN", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sentry API root
    #[arg(long = "base-url", env = "SENTRY_URL")]
    pub base_url: Option<String>,

    /// Release version; `[hash]` is replaced with the build hash
    #[arg(long, env = "SENTRY_RELEASE")]
    pub release: Option<String>,

    /// Delete existing release artifacts before uploading
    #[arg(long)]
    pub overwrite: bool,
}

impl OptionOverrides {
    /// Express the overrides as config-file options
    pub fn to_raw(&self) -> RawOptions {
        let project = match self.project.as_slice() {
            [] => None,
            [single] => Some(ProjectSlugs::One(single.clone())),
            many => Some(ProjectSlugs::Many(many.to_vec())),
        };

        RawOptions {
            organization: self.organization.clone(),
            project,
            api_key: self.api_key.clone(),
            base_sentry_url: self.base_url.clone(),
            release: self.release.clone(),
            should_overwrite: self.overwrite.then_some(true),
            ..RawOptions::default()
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Upload { output_dir, .. } | Command::Cleanup { output_dir, .. } => {
                if output_dir.as_os_str().is_empty() {
                    return Err("Output directory is required".to_string());
                }
            }
            Command::Validate { .. } => {}
        }
        Ok(())
    }

    /// Whether `--config` was left at its default
    pub fn uses_default_config(&self) -> bool {
        self.config.as_os_str() == DEFAULT_CONFIG_FILE
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print progress message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

//! Host build-tool view: emitted assets, compilations and build stats.
//!
//! The uploader only reads these. The binary builds them by scanning an output
//! directory; library users construct them from their own build pipeline.

mod filter;

pub use filter::{FileFilter, UploadFile};

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Length of the build hash, in hex characters
pub const BUILD_HASH_LENGTH: usize = 20;

/// An output file known to the build tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Logical name, `/`-separated and relative to the output directory
    pub name: String,
    /// Location on disk
    pub exists_at: PathBuf,
}

impl EmittedAsset {
    /// Create an asset reference
    pub fn new(name: impl Into<String>, exists_at: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            exists_at: exists_at.into(),
        }
    }
}

/// Result of a single compilation, as handed to `after-emit`
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Build hash
    pub hash: String,
    /// Emitted assets in emission order
    pub assets: Vec<EmittedAsset>,
    /// Build errors collector
    pub errors: Vec<String>,
    /// Build warnings collector
    pub warnings: Vec<String>,
}

impl Compilation {
    /// Create a compilation with empty collectors
    pub fn new(hash: impl Into<String>, assets: Vec<EmittedAsset>) -> Self {
        Self {
            hash: hash.into(),
            assets,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Scan an output directory into a compilation.
    ///
    /// Uses `hash` when given, otherwise hashes the emitted assets.
    pub fn from_output_dir(output_dir: &Path, hash: Option<String>) -> Result<Self> {
        let assets = scan_output_dir(output_dir)?;
        let hash = match hash {
            Some(hash) => hash,
            None => compute_build_hash(&assets)?,
        };
        Ok(Self::new(hash, assets))
    }

    /// Whether any errors were reported
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Snapshot handed to the `done` hook
    pub fn stats(&self) -> BuildStats {
        BuildStats {
            hash: self.hash.clone(),
            assets: self.assets.clone(),
        }
    }
}

/// Read-only snapshot of a finished build
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Build hash
    pub hash: String,
    /// Emitted assets in emission order
    pub assets: Vec<EmittedAsset>,
}

/// Collect every file under `output_dir`, sorted by path
pub fn scan_output_dir(output_dir: &Path) -> Result<Vec<EmittedAsset>> {
    let mut assets = Vec::new();

    for entry in WalkDir::new(output_dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(output_dir)
            .unwrap_or_else(|_| entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        assets.push(EmittedAsset::new(name, entry.path()));
    }

    log::debug!(
        "Found {} asset(s) under {}",
        assets.len(),
        output_dir.display()
    );
    Ok(assets)
}

/// SHA-256 over asset names and contents, truncated to [`BUILD_HASH_LENGTH`]
pub fn compute_build_hash(assets: &[EmittedAsset]) -> Result<String> {
    let mut hasher = Sha256::new();
    for asset in assets {
        hasher.update(asset.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(std::fs::read(&asset.exists_at)?);
    }
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(BUILD_HASH_LENGTH);
    Ok(hash)
}

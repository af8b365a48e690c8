//! Post-build removal of matching outputs.

use crate::build::BuildStats;
use crate::error::{Result, UploaderError};
use regex::Regex;
use std::path::PathBuf;

/// Remove every asset whose name matches `pattern`.
///
/// Stops at the first failure, including files that are already gone.
pub fn delete_matching(stats: &BuildStats, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for asset in stats.assets.iter().filter(|a| pattern.is_match(&a.name)) {
        std::fs::remove_file(&asset.exists_at).map_err(|source| UploaderError::Cleanup {
            path: asset.exists_at.clone(),
            source,
        })?;
        log::debug!("Removed {}", asset.exists_at.display());
        removed.push(asset.exists_at.clone());
    }

    Ok(removed)
}

//! Upload selection by include/exclude patterns.

use super::EmittedAsset;
use regex::Regex;
use std::path::PathBuf;

/// A file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Asset name as known to the build tool
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
}

/// Include/exclude test on asset names
#[derive(Debug, Clone, Copy)]
pub struct FileFilter<'a> {
    include: Option<&'a Regex>,
    exclude: Option<&'a Regex>,
}

impl<'a> FileFilter<'a> {
    /// Create a filter; `None` include selects everything
    pub fn new(include: Option<&'a Regex>, exclude: Option<&'a Regex>) -> Self {
        Self { include, exclude }
    }

    /// Included (or no include set) and not excluded
    pub fn matches(&self, name: &str) -> bool {
        self.include.is_none_or(|re| re.is_match(name))
            && !self.exclude.is_some_and(|re| re.is_match(name))
    }

    /// Select assets in input order
    pub fn select(&self, assets: &[EmittedAsset]) -> Vec<UploadFile> {
        assets
            .iter()
            .filter(|asset| self.matches(&asset.name))
            .map(|asset| UploadFile {
                name: asset.name.clone(),
                path: asset.exists_at.clone(),
            })
            .collect()
    }
}

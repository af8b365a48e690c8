//! Upload command implementation.
//!
//! Plays the host build tool: the output directory becomes a compilation,
//! `after-emit` publishes the release, `done` runs post-build cleanup.

use super::helpers::load_options;
use crate::build::Compilation;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::plugin::{BuildPlugin, ReleaseUploader};

/// Execute upload command
pub(super) async fn execute_upload(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Upload {
        output_dir,
        hash,
        overrides,
    } = &args.command
    else {
        unreachable!("execute_upload called with non-Upload command");
    };

    let options = load_options(args, overrides)?;
    let uploader = ReleaseUploader::new(options)?;

    config.info_println(&format!("Scanning {}...", output_dir.display()));
    let mut compilation = Compilation::from_output_dir(output_dir, hash.clone())?;
    config.indent(&format!(
        "{} asset(s), build hash {}",
        compilation.assets.len(),
        compilation.hash
    ));

    let selected = uploader.select_files(&compilation);
    config.info_println(&format!("Publishing release with {} file(s)...", selected.len()));
    for file in &selected {
        config.indent(&uploader.options().filename_transform.apply(&file.name));
    }

    uploader.after_emit(&mut compilation).await;

    for warning in &compilation.warnings {
        config.warning_println(warning);
    }
    for error in &compilation.errors {
        config.error_println(error);
    }

    let removed = uploader.done(&compilation.stats())?;
    if !removed.is_empty() {
        config.success_println(&format!("Removed {} file(s) after upload", removed.len()));
        for path in &removed {
            config.indent(&path.display().to_string());
        }
    }

    if compilation.has_errors() {
        return Ok(1);
    }

    if compilation.warnings.is_empty() {
        config.success_println("Release published");
    }
    Ok(0)
}

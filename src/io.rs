use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::{result::Result, types::Extension};

/// Generate a fresh random token to namespace one invocation's files.
///
/// Two concurrent invocations only stay out of each other's way through
/// this token, so it must be drawn anew for every request.
pub fn new_token() -> String {
    format!("{:08x}", fastrand::u32(..))
}

/// Build the on-disk paths of one invocation's files.
///
/// The source is always requested as mp4 from the downloader; the clip
/// container follows the configured extension.
pub fn artifact_paths(root: &Path, token: &str, ext: Extension) -> (PathBuf, PathBuf) {
    let source = root.join(format!("source_{token}.mp4"));
    let clip = root.join(format!("clip_{token}{}", ext.with_dot()));
    (source, clip)
}

/// Create the directory and its missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not create directory '{}'", path.display()))?;
    Ok(())
}

/// Remove every file in `dir` whose name starts with `prefix`.
///
/// A failed download can leave partial or fragment files next to the
/// requested destination, so cleaning up by destination path alone is
/// not enough. Removal errors are logged, not propagated.
pub fn remove_with_prefix(dir: &Path, prefix: &str) {
    let entries = match dir.read_dir() {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            if let Err(err) = std::fs::remove_file(entry.path()) {
                warn!("Could not remove '{}': {err}", entry.path().display());
            }
        }
    }
}

/// Create a named temporary file in `dir` with the correct extension.
///
/// It lives in the same directory as the final artifact so that persisting
/// it is a rename, never a cross-filesystem copy.
/// The file destructor will be called at the handle drop.
pub fn staging_file(dir: &Path, extension: Extension) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .suffix(extension.with_dot())
        .tempfile_in(dir)
        .into_diagnostic()
        .wrap_err("Could not create staging file")
        .map_err(Into::into)
}

use std::path::PathBuf;

use crate::types::Extension;

/// What to do with the downloaded source once the clip is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    /// Keep the source next to the clip, available for a later re-trim
    #[default]
    Keep,

    /// Delete the source after a successful extraction
    Purge,
}

/// Pipeline configuration.
///
/// Passed in explicitly at construction so every run, and in particular
/// every test, can point at its own directories.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving both the downloaded source and the produced clip
    pub download_root: PathBuf,

    /// Container format of the produced clip
    pub extension: Extension,

    pub retention: Retention,
}

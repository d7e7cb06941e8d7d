mod sqlite;

use std::path::Path;

use crate::result::Result;

pub use sqlite::Sqlite;

/// Record of one completed clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRecord {
    /// The artifact identifier of the run that produced the clip
    pub token: String,

    pub source_url: String,

    /// Title of the source video, as probed by the downloader
    pub title: String,

    pub start_seconds: u64,
    pub end_seconds: u64,

    pub clip_path: String,

    /// Unix timestamp of the completion
    pub created_at: i64,
}

/// A trait for keeping track of the clips produced across executions.
///
/// The pipeline works without one; a surface that wants a history of its
/// artifacts plugs one in after each successful run.
pub trait ClipStore
where
    Self: Sized,
{
    /// Open the store at the given path or create it if it does not exist.
    ///
    /// If the file does exist but does not correspond to a valid store,
    /// an error **should** be returned.
    fn open_or_create(p: &Path) -> Result<Self>;

    /// Persist the record of a completed clip.
    ///
    /// Tokens are unique per invocation, recording the same one twice
    /// **must** fail.
    fn record(&self, record: &ClipRecord) -> Result<()>;

    /// Count the records in the store.
    fn count(&self) -> Result<usize>;

    /// Return at most `limit` records, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<ClipRecord>>;
}

use serde::Deserialize;

/// The subset of the downloader's JSON probe output that the tool uses.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub title: String,

    #[serde(default)]
    pub uploader: String,

    /// Stream duration in seconds. Absent for live streams.
    #[serde(default)]
    pub duration: Option<f64>,
}

use miette::miette;

/// Failure of one pipeline invocation.
///
/// The first four variants classify which stage rejected the request, so
/// that a caller can map them to its own response format (HTTP status,
/// exit code, rendered message) without matching on message strings.
/// Everything outside the pipeline contract goes through [`Error::Miette`].
#[derive(Debug)]
pub enum Error {
    /// The time string does not follow any of the accepted formats
    MalformedTimeSpec(String),

    /// The parsed end offset is not strictly after the start offset
    InvertedRange { start: u64, end: u64 },

    /// The external downloader errored or exited non-zero
    FetchFailed(miette::Report),

    /// The extraction stage could not produce the clip
    ExtractionFailed(miette::Report),

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::MalformedTimeSpec(spec) => miette!(
                "Invalid time '{spec}': expected seconds, minutes:seconds or hours:minutes:seconds"
            ),
            Error::InvertedRange { start, end } => {
                miette!("End time ({end}s) must be greater than start time ({start}s)")
            }
            Error::FetchFailed(report) => report.wrap_err("Video download failed"),
            Error::ExtractionFailed(report) => report.wrap_err("Clip extraction failed"),
            Error::Miette(report) => report,
        }
    }
}

impl Error {
    /// Classify an unqualified report as a fetch-stage failure.
    pub fn into_fetch_failed(self) -> Error {
        match self {
            Error::Miette(report) => Error::FetchFailed(report),
            err => err,
        }
    }

    /// Classify an unqualified report as an extraction-stage failure.
    pub fn into_extraction_failed(self) -> Error {
        match self {
            Error::Miette(report) => Error::ExtractionFailed(report),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fail with an ad-hoc report.
pub fn bail<T>(msg: &'static str) -> Result<T> {
    Err(Error::Miette(miette!(msg)))
}

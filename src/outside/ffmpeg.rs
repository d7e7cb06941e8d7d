use std::{ffi::OsStr, fmt::Debug, path::Path};

use super::command::{
    assert_success_command, command_failed, run_command, Capture, FFMPEG, FFMPEG_DEFAULT_ARGS,
};
use crate::{
    result::{Error, Result},
    types::{Extension, TimeRange},
};

/// Interface for cutting a sub-range out of a local video file
pub trait ClipExtractor: Debug {
    /// Extract the `[start, end)` range of `input` into `output`,
    /// re-encoded into a standalone playable file.
    ///
    /// The source file is never modified. An end offset past the source
    /// duration clamps the clip to the actual end of the stream.
    fn extract(&self, input: &Path, output: &Path, range: &TimeRange) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug)]
pub struct Ffmpeg;

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new() -> Result<Self> {
        assert_success_command(FFMPEG, |cmd| cmd.arg("-version"))?;

        Ok(Self)
    }
}

impl ClipExtractor for Ffmpeg {
    fn extract(&self, input: &Path, output: &Path, range: &TimeRange) -> Result<()> {
        let res = run_command(
            FFMPEG,
            |cmd| {
                cmd.args(FFMPEG_DEFAULT_ARGS)
                    .arg("-y")
                    .args([OsStr::new("-i"), input.as_os_str()])
                    .arg("-ss")
                    .arg(range.start_seconds.to_string())
                    .arg("-to")
                    .arg(range.end_seconds.to_string())
                    .args(codec_args(output))
                    .arg("--")
                    .arg(output)
            },
            Capture::STDERR,
        )
        .map_err(Error::into_extraction_failed)?;

        if res.status.success() {
            Ok(())
        } else {
            Err(Error::ExtractionFailed(command_failed(FFMPEG, &res)))
        }
    }
}

/// Codec flags for the container implied by the output path.
/// Falls back to the mp4 flags for an unrecognized extension.
fn codec_args(output: &Path) -> &'static [&'static str] {
    match Extension::from_path(output) {
        Some(Extension::Mkv) => &["-c:v", "libx264", "-c:a", "aac"],
        Some(Extension::Webm) => &["-c:v", "libvpx-vp9", "-c:a", "libopus"],
        _ => &["-c:v", "libx264", "-c:a", "aac", "-movflags", "+faststart"],
    }
}

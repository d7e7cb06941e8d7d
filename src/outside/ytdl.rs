use std::{ffi::OsStr, path::Path};

use miette::{Context, IntoDiagnostic};

use super::command::{assert_success_command, command_failed, run_command, Capture, YT_DL, YT_DLP};
use crate::{
    result::{bail, Error, Result},
    types::Metadata,
};

/// Interface for fetching a remote video onto the local disk
pub trait SourceFetcher {
    /// Get the video metadata without downloading the stream.
    fn probe(&self, url: &str) -> Result<Metadata>;

    /// Download the video behind `url` into `dest`, as a broadly
    /// compatible container.
    ///
    /// On failure nothing can be assumed about the destination: the caller
    /// must not feed it to a later stage.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
pub struct Ytdl {
    program: &'static str,
}

impl Ytdl {
    /// Verify that the `yt-dlp` or `youtube-dl` binaries are reachable
    pub fn new() -> Result<Self> {
        // Check `yt-dlp`
        if assert_success_command(YT_DLP, |cmd| cmd.arg("--version")).is_ok() {
            Ok(Self { program: YT_DLP })
        } else if assert_success_command(YT_DL, |cmd| cmd.arg("--version")).is_ok() {
            // Check `youtube-dl`
            Ok(Self { program: YT_DL })
        } else {
            bail("Neither yt-dlp nor youtube-dl found")
        }
    }
}

impl SourceFetcher for Ytdl {
    fn probe(&self, url: &str) -> Result<Metadata> {
        let res = run_command(
            self.program,
            |cmd| {
                cmd.arg("-q")
                    .arg("--skip-download")
                    .arg("-j")
                    .arg("--")
                    .arg(url)
            },
            Capture::STDOUT | Capture::STDERR,
        )
        .map_err(Error::into_fetch_failed)?;

        if !res.status.success() {
            return Err(Error::FetchFailed(command_failed(self.program, &res)));
        }

        serde_json::from_slice(&res.stdout)
            .into_diagnostic()
            .wrap_err("Could not parse the downloader JSON output")
            .map_err(Error::FetchFailed)
    }

    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let res = run_command(
            self.program,
            |cmd| {
                cmd.arg("-q")
                    .args(["-f", "mp4"])
                    .args([OsStr::new("-o"), dest.as_os_str()])
                    .arg("--no-continue") // Or else fails when file already exists, even an empty one
                    .arg("--")
                    .arg(url)
            },
            Capture::STDERR,
        )
        .map_err(Error::into_fetch_failed)?;

        if res.status.success() {
            Ok(())
        } else {
            Err(Error::FetchFailed(command_failed(self.program, &res)))
        }
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::types::Extension;

macro_rules! arg_env {
    ($v:literal) => {
        concat!("VCLIP_", $v)
    };
}

/// Wrapper-tool around `yt-dlp` and `ffmpeg` to download a web video and
/// trim a standalone clip out of it.
#[derive(Parser, Debug)]
pub struct Args {
    /// The URL of the source video
    pub url: String,

    /// Start of the clip. Accepts plain seconds ("45"), "minutes:seconds"
    /// ("3:33") or "hours:minutes:seconds" ("1:02:03"), with ":", "." or a
    /// single space between components
    pub start: String,

    /// End of the clip, same formats as the start. Must be after the start
    pub end: String,

    /// The directory receiving the downloaded source and the produced clip
    #[clap(long, default_value = "downloads", env = arg_env!("OUT"))]
    pub out: PathBuf,

    /// The container format of the produced clip
    #[clap(long, value_enum, default_value_t = Extension::Mp4, env = arg_env!("EXT"))]
    pub ext: Extension,

    /// The path to an sqlite file keeping a record of the produced clips
    #[clap(long, env = arg_env!("STORE"))]
    pub store: Option<PathBuf>,

    /// Delete the downloaded source once the clip is produced,
    /// instead of keeping it for a later re-trim
    #[clap(long, env = arg_env!("PURGE_SOURCE"))]
    pub purge_source: bool,

    /// Log the pipeline stages and the external commands
    #[clap(short, long)]
    pub verbose: bool,
}

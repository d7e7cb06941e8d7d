mod command;
mod ffmpeg;
mod ytdl;

pub use ffmpeg::{ClipExtractor, Ffmpeg};
pub use ytdl::{SourceFetcher, Ytdl};

mod cli;
mod config;
mod io;
mod logging;
mod outside;
mod pipeline;
mod result;
mod store;
mod types;

use clap::Parser;
use time::OffsetDateTime;
use tracing::{debug, info, Level};

use crate::{
    cli::Args,
    config::{Config, Retention},
    logging::init_logging,
    outside::{Ffmpeg, Ytdl},
    pipeline::{ClipRequest, Pipeline},
    store::{ClipRecord, ClipStore, Sqlite},
};

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_logging(if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    })?;

    // Reject bad inputs before paying for the external binary checks
    let request = ClipRequest::new(&args.url, &args.start, &args.end)?;

    let (ytdl, ffmpeg) = load_external_components()?;

    let config = Config {
        download_root: args.out,
        extension: args.ext,
        retention: if args.purge_source {
            Retention::Purge
        } else {
            Retention::Keep
        },
    };

    let pipeline = Pipeline::new(&ytdl, &ffmpeg, config);
    let artifact = pipeline.run(&request)?;

    if let Some(store_path) = &args.store {
        let store = Sqlite::open_or_create(store_path)?;
        store.record(&ClipRecord {
            token: artifact.identifier.clone(),
            source_url: request.source_url.clone(),
            title: artifact.metadata.title.clone(),
            start_seconds: request.range.start_seconds,
            end_seconds: request.range.end_seconds,
            clip_path: artifact.clip_path.display().to_string(),
            created_at: OffsetDateTime::now_utc().unix_timestamp(),
        })?;

        debug!("{} clips recorded in '{}'", store.count()?, store_path.display());
        for record in store.recent(5)? {
            debug!(
                "  [{}] '{}' {}s..{}s",
                record.token, record.title, record.start_seconds, record.end_seconds
            );
        }
    }

    info!("Clip ready: {}", artifact.clip_path.display());
    println!("{}", artifact.clip_path.display());

    Ok(())
}

/// Load the external components
fn load_external_components() -> result::Result<(Ytdl, Ffmpeg)> {
    // Construct the handles concurrently as executing an external program
    // is not instantaneous
    let ytdl_thread = std::thread::spawn(Ytdl::new);
    let ffmpeg_thread = std::thread::spawn(Ffmpeg::new);

    let ytdl = ytdl_thread.join().expect("Could not join thread")?;
    let ffmpeg = ffmpeg_thread.join().expect("Could not join thread")?;

    Ok((ytdl, ffmpeg))
}

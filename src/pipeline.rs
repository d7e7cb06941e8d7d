use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use miette::{miette, Context, IntoDiagnostic};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, Retention},
    io::{artifact_paths, ensure_dir, new_token, remove_with_prefix, staging_file},
    outside::{ClipExtractor, SourceFetcher},
    result::{Error, Result},
    types::{Metadata, TimeRange},
};

/// One clip to produce: where the source lives and which sub-range to keep.
///
/// Building a request performs all the input validation; a request that
/// cannot be built never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRequest {
    pub source_url: String,
    pub range: TimeRange,
}

impl ClipRequest {
    pub fn new(source_url: &str, start: &str, end: &str) -> Result<Self> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(Error::Miette(miette!("Missing source URL")));
        }

        let range = TimeRange::parse(start, end)?;

        Ok(Self {
            source_url: source_url.to_owned(),
            range,
        })
    }
}

/// The files produced by one successful pipeline run.
#[derive(Debug)]
pub struct ClipArtifact {
    /// Random token namespacing this invocation's files on disk
    pub identifier: String,

    /// The downloaded source, kept or purged per the retention policy
    pub source_path: PathBuf,

    /// The finished clip
    pub clip_path: PathBuf,

    /// Probed source metadata
    pub metadata: Metadata,
}

/// Progress of one invocation, only ever moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Pending,
    Fetching,
    Extracting,
    Succeeded,
    Failed,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Pending => "pending",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        })
    }
}

/// The download-then-trim pipeline.
///
/// Stages run strictly one after the other and the first failure aborts
/// the run. No retry is attempted at this layer, that is the caller's
/// decision to make.
pub struct Pipeline<'a> {
    fetcher: &'a dyn SourceFetcher,
    extractor: &'a dyn ClipExtractor,
    config: Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        fetcher: &'a dyn SourceFetcher,
        extractor: &'a dyn ClipExtractor,
        config: Config,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    /// Run one request to completion and return the produced artifact.
    pub fn run(&self, request: &ClipRequest) -> Result<ClipArtifact> {
        let res = self.run_stages(request);
        match &res {
            Ok(artifact) => debug!(
                stage = %Stage::Succeeded,
                "Clip '{}' ready",
                artifact.clip_path.display()
            ),
            Err(_) => debug!(stage = %Stage::Failed, "Pipeline aborted"),
        }
        res
    }

    fn run_stages(&self, request: &ClipRequest) -> Result<ClipArtifact> {
        let identifier = new_token();
        debug!(
            stage = %Stage::Pending,
            "Request {identifier}: '{}', {}",
            request.source_url,
            request.range
        );

        ensure_dir(&self.config.download_root)?;
        let (source_path, clip_path) = artifact_paths(
            &self.config.download_root,
            &identifier,
            self.config.extension,
        );

        debug!(stage = %Stage::Fetching, "Downloading into '{}'", source_path.display());
        let metadata = self.fetcher.probe(&request.source_url)?;
        info!("Source: '{}' ({})", metadata.title, metadata.uploader);
        if let Some(duration) = metadata.duration {
            if request.range.end_seconds as f64 > duration {
                warn!(
                    "End offset {}s is past the end of the source ({duration:.0}s), \
                    the clip will stop there",
                    request.range.end_seconds
                );
            }
        }

        if let Err(err) = self.fetcher.fetch(&request.source_url, &source_path) {
            // A failed download must not leave anything behind that a later
            // run could mistake for a valid source. The downloader also
            // drops `.part` and fragment files next to the destination, so
            // sweep everything carrying this invocation's token
            remove_with_prefix(&self.config.download_root, &format!("source_{identifier}"));
            return Err(err);
        }

        // Extract into a staging file so the artifact path only ever holds
        // a complete clip
        debug!(stage = %Stage::Extracting, "Trimming into '{}'", clip_path.display());
        let staged = staging_file(&self.config.download_root, self.config.extension)?;
        self.extractor
            .extract(&source_path, staged.path(), &request.range)?;
        staged
            .persist(&clip_path)
            .into_diagnostic()
            .wrap_err("Could not move the finished clip into place")
            .map_err(Error::ExtractionFailed)?;

        if self.config.retention == Retention::Purge {
            debug!("Purging source '{}'", source_path.display());
            remove_if_exists(&source_path);
        }

        Ok(ClipArtifact {
            identifier,
            source_path,
            clip_path,
            metadata,
        })
    }
}

fn remove_if_exists(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove '{}': {err}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::fs;

    use super::*;
    use crate::types::Extension;

    /// Fetcher writing canned bytes instead of calling the network.
    #[derive(Debug, Default)]
    struct FakeFetcher {
        fail_fetch: bool,
        fetched: RefCell<Vec<String>>,
    }

    impl SourceFetcher for FakeFetcher {
        fn probe(&self, _url: &str) -> Result<Metadata> {
            Ok(Metadata {
                title: "Some talk".to_owned(),
                uploader: "someone".to_owned(),
                duration: Some(360.0),
            })
        }

        fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
            self.fetched.borrow_mut().push(url.to_owned());
            if self.fail_fetch {
                // Leave a partial file and a fragment behind, like an
                // interrupted download does
                fs::write(dest, b"partial").unwrap();
                fs::write(dest.with_extension("mp4.part"), b"fragment").unwrap();
                return Err(Error::FetchFailed(miette!("no such video")));
            }
            fs::write(dest, b"full video").unwrap();
            Ok(())
        }
    }

    /// Extractor writing the received range instead of running ffmpeg.
    #[derive(Debug, Default)]
    struct FakeExtractor {
        fail: Cell<bool>,
    }

    impl ClipExtractor for FakeExtractor {
        fn extract(&self, input: &Path, output: &Path, range: &TimeRange) -> Result<()> {
            assert!(input.exists(), "source must be fetched before extraction");
            if self.fail.get() {
                return Err(Error::ExtractionFailed(miette!("corrupt source")));
            }
            fs::write(output, format!("clip {range}")).unwrap();
            Ok(())
        }
    }

    fn test_config(root: &Path) -> Config {
        Config {
            download_root: root.to_path_buf(),
            extension: Extension::Mp4,
            retention: Retention::Keep,
        }
    }

    #[test]
    fn request_parses_the_range() {
        let request = ClipRequest::new("https://valid.example/video", "3:33", "5:45").unwrap();
        assert_eq!(
            request.range,
            TimeRange {
                start_seconds: 213,
                end_seconds: 345
            }
        );
    }

    #[test]
    fn inverted_range_fails_before_any_side_effect() {
        let err = ClipRequest::new("https://valid.example/video", "10", "5").unwrap_err();
        assert!(matches!(err, Error::InvertedRange { start: 10, end: 5 }));
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(ClipRequest::new("  ", "1", "2").is_err());
    }

    #[test]
    fn successful_run_produces_the_clip() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();
        let pipeline = Pipeline::new(&fetcher, &extractor, test_config(dir.path()));

        let request = ClipRequest::new("https://valid.example/video", "3:33", "5:45").unwrap();
        let artifact = pipeline.run(&request).unwrap();

        assert_eq!(
            fs::read_to_string(&artifact.clip_path).unwrap(),
            "clip 213s..345s"
        );
        // Default retention keeps the source around
        assert!(artifact.source_path.exists());
        assert_eq!(artifact.metadata.title, "Some talk");
        assert_eq!(
            fetcher.fetched.borrow().as_slice(),
            ["https://valid.example/video"]
        );
    }

    #[test]
    fn fetch_failure_leaves_no_usable_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher {
            fail_fetch: true,
            ..Default::default()
        };
        let extractor = FakeExtractor::default();
        let pipeline = Pipeline::new(&fetcher, &extractor, test_config(dir.path()));

        let request = ClipRequest::new("https://invalid.example/video", "0", "10").unwrap();
        let err = pipeline.run(&request).unwrap_err();

        assert!(matches!(err, Error::FetchFailed(_)));
        // Neither the partial download nor any clip may remain
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn extraction_failure_leaves_no_clip_at_the_artifact_path() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();
        extractor.fail.set(true);
        let pipeline = Pipeline::new(&fetcher, &extractor, test_config(dir.path()));

        let request = ClipRequest::new("https://valid.example/video", "1", "2").unwrap();
        let err = pipeline.run(&request).unwrap_err();

        assert!(matches!(err, Error::ExtractionFailed(_)));
        let clips: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("clip_"))
            .collect();
        assert!(clips.is_empty());
    }

    #[test]
    fn reruns_produce_independent_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();
        let pipeline = Pipeline::new(&fetcher, &extractor, test_config(dir.path()));

        let request = ClipRequest::new("https://valid.example/video", "1:00", "2:00").unwrap();
        let first = pipeline.run(&request).unwrap();
        let second = pipeline.run(&request).unwrap();

        assert_ne!(first.identifier, second.identifier);
        assert_ne!(first.clip_path, second.clip_path);
        assert!(first.clip_path.exists());
        assert!(second.clip_path.exists());
    }

    #[test]
    fn purge_retention_removes_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();
        let config = Config {
            retention: Retention::Purge,
            ..test_config(dir.path())
        };
        let pipeline = Pipeline::new(&fetcher, &extractor, config);

        let request = ClipRequest::new("https://valid.example/video", "1", "2").unwrap();
        let artifact = pipeline.run(&request).unwrap();

        assert!(!artifact.source_path.exists());
        assert!(artifact.clip_path.exists());
    }
}

//! Local-file media sink used for probing.
//!
//! Loading means reading the container's metadata with `lofty`, which is what
//! "metadata loaded" amounts to for a file on disk. Reads happen one at a
//! time on a single worker thread; a load whose probe has already given up
//! is skipped without touching the file.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use lofty::file::AudioFile;

use super::probe::{MediaSink, SinkError, SinkEvent};

const REMOTE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Map a candidate URI onto a path under `media_root`.
///
/// `file://` prefixes and a leading `./` are stripped; absolute paths are kept.
pub fn resolve_media_path(media_root: &Path, uri: &str) -> Result<PathBuf, SinkError> {
    if REMOTE_SCHEMES
        .iter()
        .any(|s| uri.len() >= s.len() && uri[..s.len()].eq_ignore_ascii_case(s))
    {
        return Err(SinkError::UnsupportedScheme(uri.to_string()));
    }
    let local = uri.strip_prefix("file://").unwrap_or(uri);
    let local = local.strip_prefix("./").unwrap_or(local);
    Ok(media_root.join(local))
}

struct LoadJob {
    path: PathBuf,
    events: Sender<SinkEvent>,
}

fn read_metadata(path: &Path) -> SinkEvent {
    match lofty::read_from_path(path) {
        Ok(tagged) => SinkEvent::MetadataLoaded {
            duration: Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        },
        Err(e) => SinkEvent::LoadError(e.to_string()),
    }
}

fn run_worker(jobs: Receiver<LoadJob>) {
    for job in jobs {
        // The probe's receiver is gone once it timed out or was cancelled.
        if job.events.send(SinkEvent::LoadStarted).is_err() {
            tracing::trace!(path = %job.path.display(), "skipping abandoned load");
            continue;
        }
        let _ = job.events.send(read_metadata(&job.path));
    }
}

#[derive(Debug)]
pub struct FileSink {
    media_root: PathBuf,
    worker: Mutex<Option<Sender<LoadJob>>>,
}

impl FileSink {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
            worker: Mutex::new(None),
        }
    }

    fn spawn_worker(uri: &str) -> Result<Sender<LoadJob>, SinkError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("catify-probe".into())
            .spawn(move || run_worker(rx))
            .map_err(|source| SinkError::Io {
                uri: uri.to_string(),
                source,
            })?;
        Ok(tx)
    }
}

impl MediaSink for FileSink {
    fn begin_load(&self, uri: &str, events: Sender<SinkEvent>) -> Result<(), SinkError> {
        let path = resolve_media_path(&self.media_root, uri)?;
        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());

        let mut job = LoadJob { path, events };
        if let Some(tx) = worker.as_ref() {
            match tx.send(job) {
                Ok(()) => return Ok(()),
                // The worker died; start a fresh one below.
                Err(mpsc::SendError(returned)) => job = returned,
            }
        }

        let tx = Self::spawn_worker(uri)?;
        tx.send(job).map_err(|_| SinkError::Io {
            uri: uri.to_string(),
            source: std::io::Error::other("probe worker exited"),
        })?;
        *worker = Some(tx);
        Ok(())
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::PreviewEntry;
use crate::config::{LibrarySettings, Settings};
use crate::lookup::{PreviewIndex, TrackLookup};
use crate::playback::{CandidateGenerator, FileSink, PlaybackResolver, SourceProbe};

/// Directory relative candidate URIs are resolved against.
///
/// `library.media_root` wins; otherwise the directory holding the catalog
/// file, otherwise the working directory.
pub fn media_root(arg: Option<&Path>, library: &LibrarySettings) -> PathBuf {
    if let Some(root) = &library.media_root {
        return root.clone();
    }
    let catalog_file = match arg {
        Some(p) if p.is_dir() => None,
        Some(p) => Some(p),
        None => library.catalog.as_deref(),
    };
    catalog_file
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Human-readable name of where the tracks came from.
pub fn source_label(arg: Option<&Path>, library: &LibrarySettings) -> String {
    match arg.or(library.catalog.as_deref()) {
        Some(p) => p.display().to_string(),
        None => "demo catalog".to_string(),
    }
}

pub fn build_resolver(
    settings: &Settings,
    previews: &[PreviewEntry],
    media_root: &Path,
) -> PlaybackResolver {
    let index = PreviewIndex::new(previews);
    let lookup: Option<Arc<dyn TrackLookup>> = if index.is_empty() {
        None
    } else {
        Some(Arc::new(index))
    };

    PlaybackResolver::new(
        CandidateGenerator::new(&settings.resolver),
        SourceProbe::new(
            Duration::from_millis(settings.playback.probe_timeout_ms),
            Duration::from_millis(settings.playback.probe_cancel_poll_ms),
        ),
        Arc::new(FileSink::new(media_root)),
        lookup,
    )
}

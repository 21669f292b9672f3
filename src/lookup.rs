//! Optional remote track lookup.
//!
//! A lookup turns `(title, artist)` into a preview URI and possibly a better
//! cover. It is injected into the resolver at construction time; having no
//! lookup, or a lookup that fails, only skips the first candidate tier.

use std::collections::HashMap;

use thiserror::Error;

use crate::catalog::PreviewEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupHit {
    pub preview_uri: Option<String>,
    pub cover_override: Option<String>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),
}

pub trait TrackLookup: Send + Sync {
    fn search(&self, title: &str, artist: &str) -> Result<Option<LookupHit>, LookupError>;
}

fn key(title: &str, artist: &str) -> (String, String) {
    (title.trim().to_lowercase(), artist.trim().to_lowercase())
}

/// Lookup backed by the `[[previews]]` table of a catalog file.
#[derive(Debug, Default)]
pub struct PreviewIndex {
    entries: HashMap<(String, String), LookupHit>,
}

impl PreviewIndex {
    pub fn new(previews: &[PreviewEntry]) -> Self {
        let entries = previews
            .iter()
            .map(|p| {
                (
                    key(&p.title, &p.artist),
                    LookupHit {
                        preview_uri: p.preview_url.clone(),
                        cover_override: p.album_cover.clone(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TrackLookup for PreviewIndex {
    fn search(&self, title: &str, artist: &str) -> Result<Option<LookupHit>, LookupError> {
        Ok(self.entries.get(&key(title, artist)).cloned())
    }
}

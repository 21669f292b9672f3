//! Candidate source URIs for a track, in the order they should be probed.
//!
//! Tiers, first listed wins:
//! 1. the lookup's preview URI,
//! 2. the catalog's declared source,
//! 3. guesses derived from the cover image's base name: next to the cover for
//!    each guess extension, then under each fallback root.

use crate::catalog::TrackDescriptor;
use crate::config::ResolverSettings;
use crate::lookup::LookupHit;

/// A finite, single-pass sequence of candidate URIs.
#[derive(Debug)]
pub struct Candidates(std::vec::IntoIter<String>);

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Candidates {}

#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    guess_extensions: Vec<String>,
    fallback_roots: Vec<String>,
    fallback_extensions: Vec<String>,
    image_extensions: Vec<String>,
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self::new(&ResolverSettings::default())
    }
}

fn normalized(exts: &[String]) -> Vec<String> {
    exts.iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl CandidateGenerator {
    pub fn new(settings: &ResolverSettings) -> Self {
        Self {
            guess_extensions: normalized(&settings.guess_extensions),
            fallback_roots: settings
                .fallback_roots
                .iter()
                .map(|r| r.trim().trim_end_matches('/').to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            fallback_extensions: normalized(&settings.fallback_extensions),
            image_extensions: normalized(&settings.image_extensions),
        }
    }

    pub fn generate(&self, track: &TrackDescriptor, hit: Option<&LookupHit>) -> Candidates {
        let mut out: Vec<String> = Vec::new();
        let mut push = |uri: String| {
            if !uri.is_empty() && !out.contains(&uri) {
                out.push(uri);
            }
        };

        if let Some(uri) = hit.and_then(|h| h.preview_uri.as_deref()) {
            push(uri.trim().to_string());
        }

        if let Some(src) = track.declared_source.as_deref() {
            push(src.trim().to_string());
        }

        if let Some((dir, name)) = self.cover_base(&track.cover_path) {
            for ext in &self.guess_extensions {
                push(format!("{dir}{name}.{ext}"));
            }
            for root in &self.fallback_roots {
                for ext in &self.fallback_extensions {
                    push(format!("{root}/{name}.{ext}"));
                }
            }
        }

        Candidates(out.into_iter())
    }

    /// Split a cover path into `(directory including trailing '/', base name)`.
    ///
    /// Query strings and fragments are ignored. Returns `None` unless the file
    /// carries one of the recognised image extensions.
    fn cover_base<'a>(&self, cover: &'a str) -> Option<(&'a str, &'a str)> {
        let cover = cover.split('?').next().unwrap_or_default();
        let cover = cover.split('#').next().unwrap_or_default();

        let (dir, file) = match cover.rfind('/') {
            Some(i) => cover.split_at(i + 1),
            None => ("", cover),
        };
        let (name, ext) = file.rsplit_once('.')?;
        if name.is_empty() {
            return None;
        }
        let ext = ext.to_ascii_lowercase();
        self.image_extensions
            .iter()
            .any(|e| *e == ext)
            .then_some((dir, name))
    }
}

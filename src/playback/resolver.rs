//! Turning a track descriptor into something playable.

use std::sync::Arc;

use crate::catalog::TrackDescriptor;
use crate::lookup::{LookupHit, TrackLookup};

use super::candidates::CandidateGenerator;
use super::generation::LoadTicket;
use super::probe::{MediaSink, ProbeOutcome, SourceProbe};
use super::types::ResolutionResult;

/// A load waiting to be resolved off the player thread.
#[derive(Debug, Clone)]
pub struct ResolveJob {
    pub ticket: LoadTicket,
    pub index: usize,
    pub track: TrackDescriptor,
    pub auto_play: bool,
}

/// A finished resolution on its way back to the controller.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub ticket: LoadTicket,
    pub index: usize,
    pub result: ResolutionResult,
}

pub struct PlaybackResolver {
    generator: CandidateGenerator,
    probe: SourceProbe,
    sink: Arc<dyn MediaSink>,
    lookup: Option<Arc<dyn TrackLookup>>,
}

impl PlaybackResolver {
    pub fn new(
        generator: CandidateGenerator,
        probe: SourceProbe,
        sink: Arc<dyn MediaSink>,
        lookup: Option<Arc<dyn TrackLookup>>,
    ) -> Self {
        Self {
            generator,
            probe,
            sink,
            lookup,
        }
    }

    fn lookup(&self, track: &TrackDescriptor) -> Option<LookupHit> {
        let lookup = self.lookup.as_ref()?;
        match lookup.search(&track.title, &track.artist) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(title = %track.title, artist = %track.artist, error = %e, "track lookup failed");
                None
            }
        }
    }

    /// Probe candidates one after another and stop at the first playable one.
    ///
    /// Returns `None` only when `ticket` was superseded while resolving.
    pub fn resolve(&self, track: &TrackDescriptor, ticket: &LoadTicket) -> Option<ResolutionResult> {
        let hit = self.lookup(track);
        // A hit with a preview brings its artwork along, whichever candidate plays.
        let cover_override = hit
            .as_ref()
            .filter(|h| h.preview_uri.is_some())
            .and_then(|h| h.cover_override.clone());

        let mut attempts = 0usize;
        for uri in self.generator.generate(track, hit.as_ref()) {
            attempts += 1;
            match self.probe.probe(&uri, self.sink.as_ref(), ticket) {
                ProbeOutcome::Success(found) => {
                    tracing::info!(title = %track.title, uri = %found.uri, attempts, "resolved playable source");
                    let mut result = ResolutionResult::real(found.uri, found.duration);
                    result.cover_override = cover_override;
                    return Some(result);
                }
                ProbeOutcome::Failure | ProbeOutcome::TimedOut => continue,
                ProbeOutcome::Cancelled => {
                    tracing::debug!(title = %track.title, attempts, "resolution superseded");
                    return None;
                }
            }
        }

        if !ticket.is_current() {
            return None;
        }
        tracing::info!(title = %track.title, attempts, "no playable source, simulating playback");
        let mut result = ResolutionResult::simulated();
        result.cover_override = cover_override;
        Some(result)
    }

    /// Resolve a job and package the result for the controller.
    pub fn run(&self, job: ResolveJob) -> Option<Resolved> {
        let result = self.resolve(&job.track, &job.ticket)?;
        Some(Resolved {
            ticket: job.ticket,
            index: job.index,
            result,
        })
    }
}

//! Bounded, cancellable playability checks for a single candidate.
//!
//! A probe hands the URI to a [`MediaSink`] together with the sending half of
//! a fresh channel and waits for whichever happens first: metadata loaded,
//! load error, or the timeout. The receiving half lives only as long as the
//! probe, so events a sink reports late are dropped on the floor.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use thiserror::Error;

use super::generation::LoadTicket;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// The sink picked the load up; an outcome follows.
    LoadStarted,
    MetadataLoaded { duration: Option<Duration> },
    LoadError(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("unsupported source scheme in {0}")]
    UnsupportedScheme(String),
    #[error("failed to open {uri}: {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {uri}: {reason}")]
    Decode { uri: String, reason: String },
    #[error("no audio output available: {0}")]
    NoOutput(String),
}

/// Something that can be pointed at a URI and report whether it loads.
pub trait MediaSink: Send + Sync {
    /// Start loading `uri`. Exactly one outcome event should eventually be
    /// sent on `events`, optionally preceded by `LoadStarted`; an `Err` here
    /// means the load could not even be started.
    fn begin_load(&self, uri: &str, events: Sender<SinkEvent>) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedSource {
    pub uri: String,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success(ProbedSource),
    Failure,
    TimedOut,
    /// The load this probe belonged to was superseded.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceProbe {
    timeout: Duration,
    cancel_poll: Duration,
}

impl Default for SourceProbe {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500), Duration::from_millis(50))
    }
}

impl SourceProbe {
    pub fn new(timeout: Duration, cancel_poll: Duration) -> Self {
        Self {
            timeout,
            cancel_poll: cancel_poll.max(Duration::from_millis(1)),
        }
    }

    pub fn probe(&self, uri: &str, sink: &dyn MediaSink, ticket: &LoadTicket) -> ProbeOutcome {
        if !ticket.is_current() {
            return ProbeOutcome::Cancelled;
        }

        let (tx, rx) = mpsc::channel::<SinkEvent>();
        if let Err(e) = sink.begin_load(uri, tx) {
            tracing::debug!(uri, error = %e, "candidate rejected before loading");
            return ProbeOutcome::Failure;
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(uri, timeout_ms = self.timeout.as_millis() as u64, "probe timed out");
                return ProbeOutcome::TimedOut;
            }
            let wait = (deadline - now).min(self.cancel_poll);

            match rx.recv_timeout(wait) {
                Ok(SinkEvent::MetadataLoaded { duration }) => {
                    return ProbeOutcome::Success(ProbedSource {
                        uri: uri.to_string(),
                        duration,
                    });
                }
                Ok(SinkEvent::LoadError(reason)) => {
                    tracing::debug!(uri, %reason, "candidate failed to load");
                    return ProbeOutcome::Failure;
                }
                Ok(SinkEvent::LoadStarted) => {}
                Err(RecvTimeoutError::Timeout) => {
                    if !ticket.is_current() {
                        return ProbeOutcome::Cancelled;
                    }
                }
                // The sink gave up without reporting anything.
                Err(RecvTimeoutError::Disconnected) => return ProbeOutcome::Failure,
            }
        }
    }
}

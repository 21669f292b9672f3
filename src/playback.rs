//! Track resolution and playback.
//!
//! A load asks the [`PlaybackResolver`] for the first candidate source that
//! actually loads. When one does, the track plays through a
//! [`RealPlaybackAdapter`]; when none does, a [`SimulatedPlaybackClock`]
//! keeps time so the UI behaves the same either way.

mod candidates;
mod controller;
mod file_sink;
mod generation;
mod output;
mod player;
mod probe;
mod real;
mod resolver;
mod sim_clock;
mod thread;
mod types;

pub use candidates::{CandidateGenerator, Candidates};
pub use controller::PlayerController;
pub use file_sink::{FileSink, resolve_media_path};
pub use generation::{LoadGeneration, LoadTicket};
pub use output::RodioOutput;
pub use player::{Player, PlayerError};
pub use probe::{MediaSink, ProbeOutcome, ProbedSource, SinkError, SinkEvent, SourceProbe};
pub use real::{AudioOutput, PlayError, RealEvent, RealPlaybackAdapter};
pub use resolver::{PlaybackResolver, ResolveJob, Resolved};
pub use sim_clock::{SimProfile, SimTick, SimulatedPlaybackClock};
pub use types::*;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

//! Playback-related small types and handles.
//!
//! This module defines the state the UI observes, the commands it sends and
//! the result of resolving a track into something playable.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Which adapter backs the current track.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackMode {
    /// A decodable audio source was found.
    Real,
    /// No source was playable; a software clock stands in.
    Simulated,
}

/// Controller state machine position.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum PlayerPhase {
    #[default]
    Idle,
    Loading,
    PlayingReal,
    PausedReal,
    PlayingSimulated,
    PausedSimulated,
}

impl PlayerPhase {
    pub fn is_playing(self) -> bool {
        matches!(self, Self::PlayingReal | Self::PlayingSimulated)
    }

    pub fn mode(self) -> Option<PlaybackMode> {
        match self {
            Self::PlayingReal | Self::PausedReal => Some(PlaybackMode::Real),
            Self::PlayingSimulated | Self::PausedSimulated => Some(PlaybackMode::Simulated),
            Self::Idle | Self::Loading => None,
        }
    }
}

/// The one piece of mutable state the UI observes.
///
/// Invariant: `current_time <= duration`. The duration may be provisional
/// while a real source has not reported one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub track_index: usize,
    pub mode: Option<PlaybackMode>,
    pub is_playing: bool,
    pub current_time: Duration,
    pub duration: Duration,
}

impl PlaybackState {
    /// Progress in percent, 0 when no duration is known.
    pub fn progress_percent(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.current_time.as_secs_f64() / self.duration.as_secs_f64() * 100.0).clamp(0.0, 100.0)
    }
}

/// Outcome of resolving a track. Created fresh for every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub mode: PlaybackMode,
    pub source_uri: Option<String>,
    pub cover_override: Option<String>,
    /// Duration read from the source's metadata while probing.
    pub duration_hint: Option<Duration>,
}

impl ResolutionResult {
    pub fn simulated() -> Self {
        Self {
            mode: PlaybackMode::Simulated,
            source_uri: None,
            cover_override: None,
            duration_hint: None,
        }
    }

    pub fn real(uri: impl Into<String>, duration_hint: Option<Duration>) -> Self {
        Self {
            mode: PlaybackMode::Real,
            source_uri: Some(uri.into()),
            cover_override: None,
            duration_hint,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SeekTarget {
    /// 0..=100 of the current track's duration.
    Percent(f64),
    Absolute(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCmd {
    /// Load the track at the given index, optionally starting playback.
    Load { index: usize, auto_play: bool },
    /// Toggle pause/resume.
    TogglePlay,
    /// Skip to the next track (wraps).
    Next,
    /// Go to the previous track (wraps).
    Prev,
    Seek(SeekTarget),
    /// Stop playback and return to idle.
    Stop,
    /// Shut the player thread down.
    Quit,
}

/// What is on screen for the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub cover: String,
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the UI.
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub phase: PlayerPhase,
    pub now_playing: NowPlaying,
}

pub type SnapshotHandle = Arc<Mutex<PlayerSnapshot>>;

//! Transport over a genuine audio output.

use std::time::Duration;

use thiserror::Error;

use super::probe::SinkError;

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("nothing loaded")]
    NoSource,
    /// The platform refused to start playback; the user can retry.
    #[error("playback blocked: {0}")]
    Blocked(String),
}

/// The media element a [`RealPlaybackAdapter`] drives.
pub trait AudioOutput {
    /// Load `uri` paused at zero. Returns the decoded duration when the
    /// container knows it.
    fn open(&mut self, uri: &str) -> Result<Option<Duration>, SinkError>;
    fn play(&mut self) -> Result<(), PlayError>;
    fn pause(&mut self);
    fn seek(&mut self, to: Duration) -> Result<(), SinkError>;
    fn position(&self) -> Duration;
    /// True once the loaded source has played to its end.
    fn is_finished(&self) -> bool;
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealEvent {
    TimeUpdate {
        position: Duration,
        duration: Option<Duration>,
    },
    Ended,
    Idle,
}

pub struct RealPlaybackAdapter<O> {
    output: O,
    source: Option<String>,
    duration: Option<Duration>,
    playing: bool,
    ended_emitted: bool,
}

impl<O: AudioOutput> RealPlaybackAdapter<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            source: None,
            duration: None,
            playing: false,
            ended_emitted: false,
        }
    }

    pub fn open(&mut self, uri: &str, duration_hint: Option<Duration>) -> Result<(), SinkError> {
        self.stop();
        let decoded = self.output.open(uri)?;
        self.source = Some(uri.to_string());
        self.duration = decoded.or(duration_hint).filter(|d| !d.is_zero());
        Ok(())
    }

    pub fn play(&mut self) -> Result<(), PlayError> {
        if self.source.is_none() {
            return Err(PlayError::NoSource);
        }
        match self.output.play() {
            Ok(()) => {
                self.playing = true;
                Ok(())
            }
            Err(e) => {
                self.playing = false;
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        if self.source.is_some() {
            self.output.pause();
        }
        self.playing = false;
    }

    /// Move to `time`, clamped to the known duration (or to zero when no
    /// duration is known yet). Returns the position actually requested.
    pub fn seek(&mut self, time: Duration) -> Duration {
        if self.source.is_none() {
            return Duration::ZERO;
        }
        let target = match self.duration {
            Some(d) => time.min(d),
            None => Duration::ZERO,
        };
        if let Err(e) = self.output.seek(target) {
            tracing::warn!(error = %e, "seek failed");
            return self.current_time();
        }
        self.ended_emitted = false;
        target
    }

    pub fn current_time(&self) -> Duration {
        if self.source.is_none() {
            return Duration::ZERO;
        }
        let pos = self.output.position();
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Report what the output is doing. `Ended` is reported once per source.
    pub fn poll(&mut self) -> RealEvent {
        if self.source.is_none() || !self.playing {
            return RealEvent::Idle;
        }
        if self.output.is_finished() {
            if self.ended_emitted {
                return RealEvent::Idle;
            }
            self.ended_emitted = true;
            self.playing = false;
            return RealEvent::Ended;
        }
        RealEvent::TimeUpdate {
            position: self.current_time(),
            duration: self.duration,
        }
    }

    pub fn stop(&mut self) {
        if self.source.take().is_some() {
            self.output.stop();
        }
        self.duration = None;
        self.playing = false;
        self.ended_emitted = false;
    }
}

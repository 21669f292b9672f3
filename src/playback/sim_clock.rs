//! Software clock that stands in for audio when no source is playable.
//!
//! The clock does not own a timer. Whoever drives it calls [`tick`] once per
//! simulated second while [`is_running`] is true, so stopping the clock is
//! enough to stop the recurring tick.
//!
//! [`tick`]: SimulatedPlaybackClock::tick
//! [`is_running`]: SimulatedPlaybackClock::is_running

use std::time::Duration;

use crate::config::PlaybackSettings;

const TICK: Duration = Duration::from_secs(1);
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// `d * fraction`, saturating at `d` instead of panicking when the float
/// product rounds past what a `Duration` holds.
pub(super) fn fraction_of(d: Duration, fraction: f64) -> Duration {
    Duration::try_from_secs_f64(d.as_secs_f64() * fraction)
        .unwrap_or(d)
        .min(d)
}

/// Parameters of the duration estimate `base + (index % variants) * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimProfile {
    pub base: Duration,
    pub step: Duration,
    pub variants: u64,
}

impl Default for SimProfile {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(180),
            step: Duration::from_secs(30),
            variants: 5,
        }
    }
}

impl From<&PlaybackSettings> for SimProfile {
    fn from(p: &PlaybackSettings) -> Self {
        Self {
            base: Duration::from_secs(p.sim_base_secs),
            step: Duration::from_secs(p.sim_step_secs),
            variants: p.sim_variants.max(1),
        }
    }
}

impl SimProfile {
    fn checked_estimate(&self, slot: u64) -> Option<Duration> {
        let nanos = self.step.as_nanos().checked_mul(u128::from(slot))?;
        let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
        let extra = Duration::new(secs, (nanos % NANOS_PER_SEC) as u32);
        self.base.checked_add(extra)
    }

    /// Longest estimate this profile produces, `None` if it overflows `Duration`.
    pub fn longest(&self) -> Option<Duration> {
        self.checked_estimate(self.variants.max(1) - 1)
    }

    /// Saturates at `Duration::MAX` for profiles whose estimate overflows.
    pub fn estimate(&self, track_index: usize) -> Duration {
        let slot = (track_index as u64) % self.variants.max(1);
        self.checked_estimate(slot).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClockState {
    track_index: usize,
    elapsed: Duration,
    estimated: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimTick {
    Advanced(Duration),
    /// The estimate was reached; the clock has stopped itself.
    Ended,
    Idle,
}

#[derive(Debug, Default)]
pub struct SimulatedPlaybackClock {
    profile: SimProfile,
    state: Option<ClockState>,
    running: bool,
}

impl SimulatedPlaybackClock {
    pub fn new(profile: SimProfile) -> Self {
        Self {
            profile,
            state: None,
            running: false,
        }
    }

    /// Fresh state for `track_index`: elapsed zero, new estimate, not running.
    pub fn reset_for(&mut self, track_index: usize) {
        self.running = false;
        self.state = Some(ClockState {
            track_index,
            elapsed: Duration::ZERO,
            estimated: self.profile.estimate(track_index),
        });
    }

    /// Start (or resume) the clock.
    ///
    /// With `reset_time`, without an estimate, or for a different track the
    /// clock restarts from zero; otherwise it resumes where it was paused.
    pub fn start(&mut self, track_index: usize, reset_time: bool) {
        let resumable = self
            .state
            .is_some_and(|s| s.track_index == track_index);
        if reset_time || !resumable {
            self.reset_for(track_index);
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Drop all state; the next `start` begins from scratch.
    pub fn reset(&mut self) {
        self.running = false;
        self.state = None;
    }

    pub fn tick(&mut self) -> SimTick {
        if !self.running {
            return SimTick::Idle;
        }
        let Some(state) = self.state.as_mut() else {
            self.running = false;
            return SimTick::Idle;
        };
        state.elapsed = state.elapsed.saturating_add(TICK).min(state.estimated);
        if state.elapsed >= state.estimated {
            self.running = false;
            return SimTick::Ended;
        }
        SimTick::Advanced(state.elapsed)
    }

    /// Map `percent` (clamped to 0..=100) onto the estimated duration.
    pub fn seek(&mut self, percent: f64) -> Duration {
        let Some(state) = self.state.as_mut() else {
            return Duration::ZERO;
        };
        let fraction = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0) / 100.0
        };
        state.elapsed = fraction_of(state.estimated, fraction);
        state.elapsed
    }

    pub fn seek_to(&mut self, time: Duration) -> Duration {
        let Some(state) = self.state.as_mut() else {
            return Duration::ZERO;
        };
        state.elapsed = time.min(state.estimated);
        state.elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.state.map(|s| s.elapsed).unwrap_or_default()
    }

    pub fn estimated_duration(&self) -> Option<Duration> {
        self.state.map(|s| s.estimated)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

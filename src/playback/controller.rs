//! The player state machine.
//!
//! `Idle -> Loading -> {PlayingReal, PausedReal, PlayingSimulated, PausedSimulated} -> Loading -> ...`
//!
//! The controller is the only writer of [`PlaybackState`]. Adapters report
//! what happened; the controller decides what that means. Loads are
//! resolved elsewhere: every method that starts a load hands back a
//! [`ResolveJob`] and the outcome comes back through
//! [`PlayerController::apply_resolution`], which ignores anything but the
//! most recent load.

use std::time::Duration;

use crate::catalog::TrackDescriptor;

use super::generation::LoadGeneration;
use super::real::{AudioOutput, RealEvent, RealPlaybackAdapter};
use super::resolver::{ResolveJob, Resolved};
use super::sim_clock::{SimProfile, SimTick, SimulatedPlaybackClock, fraction_of};
use super::types::{
    NowPlaying, PlaybackMode, PlaybackState, PlayerCmd, PlayerPhase, PlayerSnapshot, SeekTarget,
};

#[derive(Debug, Clone, Copy)]
struct PendingLoad {
    generation: u64,
    auto_play: bool,
}

pub struct PlayerController<O> {
    tracks: Vec<TrackDescriptor>,
    state: PlaybackState,
    phase: PlayerPhase,
    now_playing: NowPlaying,
    real: RealPlaybackAdapter<O>,
    sim: SimulatedPlaybackClock,
    generation: LoadGeneration,
    pending: Option<PendingLoad>,
}

impl<O: AudioOutput> PlayerController<O> {
    pub fn new(tracks: Vec<TrackDescriptor>, output: O, profile: SimProfile) -> Self {
        Self {
            tracks,
            state: PlaybackState::default(),
            phase: PlayerPhase::Idle,
            now_playing: NowPlaying::default(),
            real: RealPlaybackAdapter::new(output),
            sim: SimulatedPlaybackClock::new(profile),
            generation: LoadGeneration::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state.clone(),
            phase: self.phase,
            now_playing: self.now_playing.clone(),
        }
    }

    /// Whether the simulated clock wants its once-per-second tick.
    pub fn sim_running(&self) -> bool {
        self.sim.is_running()
    }

    pub fn handle(&mut self, cmd: PlayerCmd) -> Option<ResolveJob> {
        match cmd {
            PlayerCmd::Load { index, auto_play } => self.load_track(index, auto_play),
            PlayerCmd::TogglePlay => self.toggle_play(),
            PlayerCmd::Next => self.next(),
            PlayerCmd::Prev => self.prev(),
            PlayerCmd::Seek(target) => {
                self.seek(target);
                None
            }
            PlayerCmd::Stop | PlayerCmd::Quit => {
                self.stop();
                None
            }
        }
    }

    /// Enter `Loading` for `index` (taken modulo the playlist length) and
    /// return the job that will resolve it. `None` for an empty playlist.
    pub fn load_track(&mut self, index: usize, auto_play: bool) -> Option<ResolveJob> {
        if self.tracks.is_empty() {
            return None;
        }
        let index = index % self.tracks.len();
        let ticket = self.generation.bump();

        self.real.stop();
        self.sim.reset();
        self.phase = PlayerPhase::Loading;
        self.pending = Some(PendingLoad {
            generation: ticket.generation(),
            auto_play,
        });

        let track = self.tracks[index].clone();
        self.state.track_index = index;
        self.now_playing = NowPlaying {
            title: track.title.clone(),
            artist: track.artist.clone(),
            cover: track.cover_path.clone(),
        };
        self.sync_state();

        tracing::debug!(index, auto_play, generation = ticket.generation(), "loading track");
        Some(ResolveJob {
            ticket,
            index,
            track,
            auto_play,
        })
    }

    /// Activate the adapter a resolution picked. Returns `false` when the
    /// result belongs to a load that has since been superseded.
    pub fn apply_resolution(&mut self, resolved: Resolved) -> bool {
        let generation = resolved.ticket.generation();
        let pending = match self.pending {
            Some(p) if p.generation == generation && resolved.ticket.is_current() => p,
            _ => {
                tracing::debug!(generation, index = resolved.index, "discarding stale resolution");
                return false;
            }
        };
        self.pending = None;

        let index = self.state.track_index;
        let result = resolved.result;
        if let Some(cover) = result.cover_override {
            self.now_playing.cover = cover;
        }

        match (result.mode, result.source_uri) {
            (PlaybackMode::Real, Some(uri)) => match self.real.open(&uri, result.duration_hint) {
                Ok(()) => {
                    self.phase = PlayerPhase::PausedReal;
                    if pending.auto_play {
                        self.start_real();
                    }
                }
                Err(e) => {
                    tracing::warn!(%uri, error = %e, "output could not open resolved source, simulating");
                    self.activate_simulated(index, pending.auto_play);
                }
            },
            _ => self.activate_simulated(index, pending.auto_play),
        }

        self.sync_state();
        true
    }

    pub fn toggle_play(&mut self) -> Option<ResolveJob> {
        match self.phase {
            PlayerPhase::Idle => return self.load_track(self.state.track_index, true),
            PlayerPhase::Loading => {
                if let Some(p) = self.pending.as_mut() {
                    p.auto_play = !p.auto_play;
                }
            }
            PlayerPhase::PlayingReal => {
                self.real.pause();
                self.phase = PlayerPhase::PausedReal;
            }
            PlayerPhase::PausedReal => self.start_real(),
            PlayerPhase::PlayingSimulated => {
                self.sim.pause();
                self.phase = PlayerPhase::PausedSimulated;
            }
            PlayerPhase::PausedSimulated => {
                self.sim.start(self.state.track_index, false);
                self.phase = PlayerPhase::PlayingSimulated;
            }
        }
        self.sync_state();
        None
    }

    pub fn next(&mut self) -> Option<ResolveJob> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        self.load_track((self.state.track_index + 1) % len, true)
    }

    pub fn prev(&mut self) -> Option<ResolveJob> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        self.load_track((self.state.track_index % len + len - 1) % len, true)
    }

    pub fn seek(&mut self, target: SeekTarget) {
        match self.phase.mode() {
            Some(PlaybackMode::Real) => {
                let time = match target {
                    SeekTarget::Percent(p) => self
                        .real
                        .duration()
                        .map(|d| fraction_of(d, clamp_percent(p) / 100.0))
                        .unwrap_or(Duration::ZERO),
                    SeekTarget::Absolute(t) => t,
                };
                self.real.seek(time);
            }
            Some(PlaybackMode::Simulated) => {
                match target {
                    SeekTarget::Percent(p) => self.sim.seek(p),
                    SeekTarget::Absolute(t) => self.sim.seek_to(t),
                };
            }
            None => return,
        }
        self.sync_state();
    }

    /// One simulated second. Reaching the end advances to the next track.
    pub fn tick(&mut self) -> Option<ResolveJob> {
        match self.sim.tick() {
            SimTick::Idle => None,
            SimTick::Advanced(_) => {
                self.sync_state();
                None
            }
            SimTick::Ended => {
                self.sync_state();
                tracing::debug!(index = self.state.track_index, "simulated track ended");
                self.next()
            }
        }
    }

    /// Pick up position changes and end-of-track from the real output.
    pub fn poll_media(&mut self) -> Option<ResolveJob> {
        if self.phase != PlayerPhase::PlayingReal {
            return None;
        }
        match self.real.poll() {
            RealEvent::Idle => None,
            RealEvent::TimeUpdate { .. } => {
                self.sync_state();
                None
            }
            RealEvent::Ended => {
                tracing::debug!(index = self.state.track_index, "track ended");
                self.next()
            }
        }
    }

    /// Cancel any in-flight load and silence both adapters.
    pub fn stop(&mut self) {
        self.generation.invalidate();
        self.pending = None;
        self.real.stop();
        self.sim.reset();
        self.phase = PlayerPhase::Idle;
        self.sync_state();
    }

    fn start_real(&mut self) {
        match self.real.play() {
            Ok(()) => self.phase = PlayerPhase::PlayingReal,
            Err(e) => {
                tracing::info!(error = %e, "playback did not start, staying paused");
                self.phase = PlayerPhase::PausedReal;
            }
        }
    }

    fn activate_simulated(&mut self, index: usize, auto_play: bool) {
        self.real.stop();
        self.sim.reset_for(index);
        if auto_play {
            self.sim.start(index, false);
            self.phase = PlayerPhase::PlayingSimulated;
        } else {
            self.phase = PlayerPhase::PausedSimulated;
        }
    }

    fn sync_state(&mut self) {
        let (current, duration) = match self.phase.mode() {
            Some(PlaybackMode::Real) => {
                let current = self.real.current_time();
                let duration = self.real.duration().unwrap_or(self.state.duration);
                (current, duration)
            }
            Some(PlaybackMode::Simulated) => (
                self.sim.elapsed(),
                self.sim.estimated_duration().unwrap_or_default(),
            ),
            None => (Duration::ZERO, Duration::ZERO),
        };

        self.state.mode = self.phase.mode();
        self.state.is_playing = self.phase.is_playing();
        self.state.current_time = current;
        // A real source without metadata only has a provisional duration.
        self.state.duration = duration.max(current);
    }
}

fn clamp_percent(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) }
}

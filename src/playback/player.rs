use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::TrackDescriptor;
use crate::config::PlaybackSettings;

use super::real::AudioOutput;
use super::resolver::PlaybackResolver;
use super::sim_clock::SimProfile;
use super::thread::{LoopTiming, PlayerMsg, spawn_player_thread};
use super::types::{PlayerCmd, PlayerSnapshot, SnapshotHandle};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to start player thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("player thread has shut down")]
    Gone,
}

/// Handle to the player thread.
pub struct Player {
    tx: Sender<PlayerMsg>,
    snapshot: SnapshotHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Start the player thread. `make_output` runs on that thread, so the
    /// output itself does not have to be `Send`.
    pub fn spawn<O, F>(
        tracks: Vec<TrackDescriptor>,
        resolver: PlaybackResolver,
        settings: &PlaybackSettings,
        make_output: F,
    ) -> Result<Self, PlayerError>
    where
        O: AudioOutput,
        F: FnOnce() -> O + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PlayerMsg>();
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(PlayerSnapshot::default()));
        let timing = LoopTiming {
            tick: Duration::from_millis(settings.tick_ms.max(1)),
            media_poll: Duration::from_millis(settings.media_poll_ms.max(1)),
        };

        let handle = spawn_player_thread(
            make_output,
            tracks,
            Arc::new(resolver),
            SimProfile::from(settings),
            timing,
            tx.clone(),
            rx,
            snapshot.clone(),
        )?;

        Ok(Self {
            tx,
            snapshot,
            join: Mutex::new(Some(handle)),
        })
    }

    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), PlayerError> {
        self.tx
            .send(PlayerMsg::Cmd(cmd))
            .map_err(|_| PlayerError::Gone)
    }

    /// Stop playback, cancel in-flight loads and wait for the thread to exit.
    pub fn quit(&self) {
        let _ = self.send(PlayerCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.quit();
    }
}

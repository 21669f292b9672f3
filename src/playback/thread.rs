use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::catalog::TrackDescriptor;

use super::controller::PlayerController;
use super::real::AudioOutput;
use super::resolver::{PlaybackResolver, ResolveJob, Resolved};
use super::sim_clock::SimProfile;
use super::types::{PlayerCmd, SnapshotHandle};

/// Everything the player thread listens to.
#[derive(Debug)]
pub(super) enum PlayerMsg {
    Cmd(PlayerCmd),
    Resolved(Resolved),
}

#[derive(Debug, Clone, Copy)]
pub(super) struct LoopTiming {
    /// Length of one simulated second.
    pub tick: Duration,
    /// How often the real output is polled for position and end-of-track.
    pub media_poll: Duration,
}

/// Run a resolution on its own thread; the outcome comes back as a message.
fn dispatch(resolver: &Arc<PlaybackResolver>, tx: &Sender<PlayerMsg>, job: ResolveJob) {
    let worker_resolver = Arc::clone(resolver);
    let worker_tx = tx.clone();
    let worker_job = job.clone();
    let spawned = thread::Builder::new()
        .name("catify-resolve".to_string())
        .spawn(move || {
            if let Some(resolved) = worker_resolver.run(worker_job) {
                let _ = worker_tx.send(PlayerMsg::Resolved(resolved));
            }
        });

    if let Err(e) = spawned {
        tracing::error!(error = %e, "could not spawn resolver thread, resolving inline");
        if let Some(resolved) = resolver.run(job) {
            let _ = tx.send(PlayerMsg::Resolved(resolved));
        }
    }
}

fn publish<O: AudioOutput>(controller: &PlayerController<O>, snapshot: &SnapshotHandle) {
    if let Ok(mut s) = snapshot.lock() {
        *s = controller.snapshot();
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn spawn_player_thread<O, F>(
    make_output: F,
    tracks: Vec<TrackDescriptor>,
    resolver: Arc<PlaybackResolver>,
    profile: SimProfile,
    timing: LoopTiming,
    tx: Sender<PlayerMsg>,
    rx: Receiver<PlayerMsg>,
    snapshot: SnapshotHandle,
) -> std::io::Result<JoinHandle<()>>
where
    O: AudioOutput,
    F: FnOnce() -> O + Send + 'static,
{
    thread::Builder::new()
        .name("catify-player".to_string())
        .spawn(move || {
            let mut controller = PlayerController::new(tracks, make_output(), profile);
            // Deadline of the next simulated second; only set while the clock runs.
            let mut next_tick: Option<Instant> = None;

            loop {
                let wait = match next_tick {
                    Some(due) => timing
                        .media_poll
                        .min(due.saturating_duration_since(Instant::now())),
                    None => timing.media_poll,
                };

                let job = match rx.recv_timeout(wait) {
                    Ok(PlayerMsg::Cmd(PlayerCmd::Quit)) => {
                        controller.stop();
                        publish(&controller, &snapshot);
                        break;
                    }
                    Ok(PlayerMsg::Cmd(cmd)) => controller.handle(cmd),
                    Ok(PlayerMsg::Resolved(resolved)) => {
                        controller.apply_resolution(resolved);
                        None
                    }
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                };
                if let Some(job) = job {
                    dispatch(&resolver, &tx, job);
                }

                if let Some(job) = controller.poll_media() {
                    dispatch(&resolver, &tx, job);
                }

                if controller.sim_running() {
                    let now = Instant::now();
                    let due = *next_tick.get_or_insert(now + timing.tick);
                    if now >= due {
                        next_tick = Some(due + timing.tick);
                        if let Some(job) = controller.tick() {
                            dispatch(&resolver, &tx, job);
                        }
                    }
                } else {
                    next_tick = None;
                }

                publish(&controller, &snapshot);
            }

            tracing::debug!("player thread exiting");
        })
}

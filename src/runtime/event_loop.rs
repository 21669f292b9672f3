use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::playback::{Player, PlayerCmd, SeekTarget};
use crate::store::KeyValueStore;
use crate::ui;

/// What a key press asks for, decided before anything is touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    CursorDown,
    CursorUp,
    CursorTop,
    CursorBottom,
    PlaySelected,
    TogglePlay,
    Next,
    Prev,
    /// Jump relative to the current position, in percent of the track.
    SeekBy(f64),
    /// Jump to an absolute position, in percent of the track.
    SeekTo(f64),
    Stop,
    ToggleLike,
    ToggleDetails,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Translate a key into an [`Action`].
pub fn map_key(
    code: KeyCode,
    playback: &config::PlaybackSettings,
    state: &mut EventLoopState,
) -> Option<Action> {
    let gg = std::mem::take(&mut state.pending_gg);
    let step = playback.seek_step_percent;

    let action = match code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::CursorDown,
        KeyCode::Char('k') | KeyCode::Up => Action::CursorUp,
        KeyCode::Char('g') => {
            if gg {
                Action::CursorTop
            } else {
                state.pending_gg = true;
                return None;
            }
        }
        KeyCode::Char('G') => Action::CursorBottom,
        KeyCode::Enter => Action::PlaySelected,
        KeyCode::Char('p') | KeyCode::Char(' ') => Action::TogglePlay,
        KeyCode::Char('l') => Action::Next,
        KeyCode::Char('h') => Action::Prev,
        KeyCode::Char('L') => Action::SeekBy(step),
        KeyCode::Char('H') => Action::SeekBy(-step),
        KeyCode::Char(c @ '0'..='9') => Action::SeekTo(f64::from(c as u8 - b'0') * 10.0),
        KeyCode::Char('s') => Action::Stop,
        KeyCode::Char('f') => Action::ToggleLike,
        KeyCode::Char('K') => Action::ToggleDetails,
        _ => return None,
    };
    Some(action)
}

/// Main terminal event loop: handles input, UI drawing and sync with the
/// player thread. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    store: &dyn KeyValueStore,
    state: &mut EventLoopState,
) -> Result<()> {
    loop {
        let snapshot = app.snapshot();
        if let Some(snap) = snapshot.as_ref() {
            if snap.phase != crate::playback::PlayerPhase::Idle {
                app.follow(snap);
            }
        }

        terminal.draw(|f| ui::draw(f, app, snapshot.as_ref(), &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(key, settings, app, player, store, state)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    store: &dyn KeyValueStore,
    state: &mut EventLoopState,
) -> Result<bool> {
    if key.kind != KeyEventKind::Press {
        return Ok(false);
    }
    let Some(action) = map_key(key.code, &settings.playback, state) else {
        return Ok(false);
    };
    app.message = None;

    let cmd = match action {
        Action::Quit => {
            player.quit();
            return Ok(true);
        }
        Action::CursorDown => {
            app.follow_playback_off();
            app.next();
            None
        }
        Action::CursorUp => {
            app.follow_playback_off();
            app.prev();
            None
        }
        Action::CursorTop => {
            app.follow_playback_off();
            app.select_first();
            None
        }
        Action::CursorBottom => {
            app.follow_playback_off();
            app.select_last();
            None
        }
        Action::PlaySelected => {
            let already_playing = app
                .snapshot()
                .is_some_and(|s| s.state.is_playing && s.state.track_index == app.selected);
            if !app.has_tracks() || already_playing {
                None
            } else {
                app.follow_playback_on();
                Some(PlayerCmd::Load {
                    index: app.selected,
                    auto_play: true,
                })
            }
        }
        Action::TogglePlay => {
            app.follow_playback_on();
            Some(PlayerCmd::TogglePlay)
        }
        Action::Next => {
            app.follow_playback_on();
            Some(PlayerCmd::Next)
        }
        Action::Prev => {
            app.follow_playback_on();
            Some(PlayerCmd::Prev)
        }
        Action::SeekBy(delta) => {
            let now = app
                .snapshot()
                .map(|s| s.state.progress_percent())
                .unwrap_or(0.0);
            Some(PlayerCmd::Seek(SeekTarget::Percent(
                (now + delta).clamp(0.0, 100.0),
            )))
        }
        Action::SeekTo(percent) => Some(PlayerCmd::Seek(SeekTarget::Percent(percent))),
        Action::Stop => Some(PlayerCmd::Stop),
        Action::ToggleLike => {
            if let Some(liked) = app.toggle_like_selected() {
                match app.liked.save(store) {
                    Ok(()) => {
                        app.message = Some(if liked { "liked" } else { "unliked" }.to_string());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to save liked songs");
                        app.message = Some(format!("could not save liked songs: {e}"));
                    }
                }
            }
            None
        }
        Action::ToggleDetails => {
            app.toggle_details_window();
            None
        }
    };

    if let Some(cmd) = cmd {
        if let Err(e) = player.send(cmd) {
            tracing::error!(error = %e, "player command dropped");
            app.message = Some(e.to_string());
        }
    }
    Ok(false)
}

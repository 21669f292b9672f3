use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::catalog::load_catalog;
use crate::config;
use crate::playback::{Player, PlayerCmd, RodioOutput};
use crate::store::{FileStore, LikedSongs};

mod event_loop;
mod logging;
mod settings;
mod startup;

fn store_dir(settings: &config::Settings) -> PathBuf {
    settings
        .store
        .dir
        .clone()
        .or_else(config::default_data_dir)
        .unwrap_or_else(|| PathBuf::from(".catify"))
}

pub fn run() -> Result<()> {
    let (settings, config_problem) = settings::load_settings();

    let log_path = logging::log_path(&settings.logging);
    logging::init_tracing_to_file(&log_path, &settings.logging.filter)?;
    if let Some(problem) = config_problem {
        tracing::warn!("{problem}");
    }

    let arg = env::args_os().nth(1).map(PathBuf::from);
    let catalog = load_catalog(arg.as_deref(), &settings.library).context("failed to load catalog")?;
    let media_root = startup::media_root(arg.as_deref(), &settings.library);
    tracing::info!(
        tracks = catalog.tracks.len(),
        previews = catalog.previews.len(),
        media_root = %media_root.display(),
        "catalog ready"
    );

    let store = FileStore::new(store_dir(&settings));
    let liked = LikedSongs::load(&store).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read liked songs");
        LikedSongs::default()
    });
    tracing::debug!(dir = %store.dir().display(), liked = liked.len(), "store opened");

    let resolver = startup::build_resolver(&settings, &catalog.previews, &media_root);
    let output_root = media_root.clone();
    let player = Player::spawn(catalog.tracks.clone(), resolver, &settings.playback, move || {
        RodioOutput::new(output_root)
    })
    .context("failed to start player")?;

    let mut app = App::new(catalog.tracks, liked);
    app.set_source_label(startup::source_label(arg.as_deref(), &settings.library));
    app.set_snapshot_handle(player.snapshot_handle());

    if settings.playback.autoplay_on_start && app.has_tracks() {
        let _ = player.send(PlayerCmd::Load {
            index: 0,
            auto_play: true,
        });
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &settings, &mut app, &player, &store, &mut state)
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.quit();
    tracing::info!("bye");
    run_result
}

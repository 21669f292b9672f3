use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/catify/config.toml` or `~/.config/catify/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CATIFY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub resolver: ResolverSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How long a single candidate may take to report metadata (milliseconds).
    pub probe_timeout_ms: u64,
    /// How often a waiting probe checks whether its load was superseded (milliseconds).
    pub probe_cancel_poll_ms: u64,
    /// Interval of the simulated playback clock (milliseconds). One tick is one
    /// second of simulated playback.
    pub tick_ms: u64,
    /// How often the real audio output is polled for position and end-of-track.
    pub media_poll_ms: u64,
    /// Simulated duration = `sim_base_secs + (index % sim_variants) * sim_step_secs`.
    pub sim_base_secs: u64,
    pub sim_step_secs: u64,
    pub sim_variants: u64,
    /// Start playing the first track as soon as the player comes up.
    pub autoplay_on_start: bool,
    /// Percentage jumped by the `H` / `L` keys.
    pub seek_step_percent: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 1500,
            probe_cancel_poll_ms: 50,
            tick_ms: 1000,
            media_poll_ms: 200,
            sim_base_secs: 180,
            sim_step_secs: 30,
            sim_variants: 5,
            autoplay_on_start: false,
            seek_step_percent: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Extensions tried next to the cover image, in order (without dot).
    pub guess_extensions: Vec<String>,
    /// Fixed roots tried after the cover directory, in order.
    pub fallback_roots: Vec<String>,
    /// Extensions tried under each fallback root, in order.
    pub fallback_extensions: Vec<String>,
    /// Cover extensions from which a base name may be derived (case-insensitive).
    pub image_extensions: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            guess_extensions: vec!["mp3".into(), "m4a".into(), "wav".into()],
            fallback_roots: vec!["audio".into(), "songs".into()],
            fallback_extensions: vec!["mp3".into()],
            image_extensions: vec![
                "jpg".into(),
                "jpeg".into(),
                "png".into(),
                "webp".into(),
                "avif".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory that relative candidate URIs are resolved against.
    /// Defaults to the current working directory.
    pub media_root: Option<PathBuf>,
    /// TOML catalog used when no path is given on the command line.
    pub catalog: Option<PathBuf>,
    /// File extensions treated as audio when scanning a directory (case-insensitive, without dot).
    pub audio_extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            media_root: None,
            catalog: None,
            audio_extensions: vec![
                "mp3".into(),
                "m4a".into(),
                "wav".into(),
                "flac".into(),
                "ogg".into(),
            ],
            follow_links: true,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which time fields to show next to the progress bar, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub time_fields: Vec<TimeField>,

    /// Separator used to join `time_fields`.
    pub time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ catify ~ ".to_string(),
            time_fields: vec![TimeField::Elapsed, TimeField::Total],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file. Defaults to `catify.log` in the platform temp directory.
    pub file: Option<PathBuf>,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory for persisted records. Defaults to `$XDG_DATA_HOME/catify`
    /// or `~/.local/share/catify`.
    pub dir: Option<PathBuf>,
}

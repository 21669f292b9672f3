use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `CATIFY__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CATIFY")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.playback;
        if p.probe_timeout_ms == 0 {
            return Err("playback.probe_timeout_ms must be >= 1".to_string());
        }
        if p.probe_cancel_poll_ms == 0 {
            return Err("playback.probe_cancel_poll_ms must be >= 1".to_string());
        }
        if p.tick_ms == 0 || p.media_poll_ms == 0 {
            return Err("playback.tick_ms and playback.media_poll_ms must be >= 1".to_string());
        }
        if p.sim_variants == 0 {
            return Err("playback.sim_variants must be >= 1".to_string());
        }
        let longest = u128::from(p.sim_base_secs)
            + u128::from(p.sim_step_secs) * u128::from(p.sim_variants - 1);
        if longest > u128::from(u64::MAX) {
            return Err(
                "playback.sim_base_secs + (sim_variants - 1) * sim_step_secs is too large".to_string(),
            );
        }
        if !(p.seek_step_percent > 0.0 && p.seek_step_percent <= 100.0) {
            return Err("playback.seek_step_percent must be in (0, 100]".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `CATIFY_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CATIFY_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/catify/config.toml`
/// or `~/.config/catify/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("catify").join("config.toml"))
}

/// Compute the default data directory `$XDG_DATA_HOME/catify` or `~/.local/share/catify`.
pub fn default_data_dir() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share").map(|d| d.join("catify"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::LibrarySettings;

use super::builtin::demo_tracks;
use super::model::Catalog;
use super::scan::scan;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse a TOML catalog (`[[tracks]]` and optional `[[previews]]` tables).
pub fn parse_catalog(text: &str, path: &Path) -> Result<Catalog, CatalogError> {
    toml::from_str(text).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&text, path)
}

/// Pick the catalog source: an explicit directory is scanned, an explicit file
/// is parsed, then the configured catalog file, then the built-in demo shelf.
pub fn load_catalog(arg: Option<&Path>, settings: &LibrarySettings) -> Result<Catalog, CatalogError> {
    if let Some(p) = arg {
        if p.is_dir() {
            let tracks = scan(p, settings);
            tracing::info!(dir = %p.display(), tracks = tracks.len(), "scanned music directory");
            return Ok(Catalog {
                tracks,
                previews: Vec::new(),
            });
        }
        return load_catalog_file(p);
    }

    if let Some(p) = &settings.catalog {
        return load_catalog_file(p);
    }

    tracing::info!("no catalog given, using the demo shelf");
    Ok(Catalog {
        tracks: demo_tracks(),
        previews: Vec::new(),
    })
}

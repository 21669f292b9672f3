//! Small persistent key/value store and the liked-songs list kept in it.
//!
//! Values are stored as JSON, one file per key: `<dir>/<key>.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::TrackDescriptor;

pub const LIKED_SONGS_KEY: &str = "catifyy_liked_songs";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed value under {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A [`KeyValueStore`] rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }
}

/// Read and deserialize the value under `key`, if any.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(text) = store.get_raw(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })
}

pub fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set_raw(key, &text)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedSong {
    pub title: String,
    pub artist: String,
    pub cover: String,
}

/// Songs the user liked, keyed by `(title, artist)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikedSongs {
    songs: Vec<LikedSong>,
}

impl LikedSongs {
    /// Load from `store`. A malformed value is logged and treated as empty.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        match get_json::<Vec<LikedSong>>(store, LIKED_SONGS_KEY) {
            Ok(songs) => Ok(Self {
                songs: songs.unwrap_or_default(),
            }),
            Err(StoreError::Json { key, source }) => {
                tracing::warn!(%key, error = %source, "ignoring malformed liked songs");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        set_json(store, LIKED_SONGS_KEY, &self.songs)
    }

    pub fn contains(&self, track: &TrackDescriptor) -> bool {
        self.songs
            .iter()
            .any(|s| track.same_song(&s.title, &s.artist))
    }

    /// Like or unlike `track`. Returns whether it is liked afterwards.
    pub fn toggle(&mut self, track: &TrackDescriptor) -> bool {
        if let Some(pos) = self
            .songs
            .iter()
            .position(|s| track.same_song(&s.title, &s.artist))
        {
            self.songs.remove(pos);
            return false;
        }
        self.songs.push(LikedSong {
            title: track.title.clone(),
            artist: track.artist.clone(),
            cover: track.cover_path.clone(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

use serde::{Deserialize, Serialize};

/// Which shelf of the home screen a track belongs to.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    #[default]
    #[serde(alias = "card")]
    Trending,
    Album,
    Row,
}

/// A logical track as supplied by the catalog. Identity is `(title, artist)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub title: String,
    pub artist: String,
    /// Cover image path; its base name seeds the filename guesses.
    #[serde(rename = "cover", default)]
    pub cover_path: String,
    /// Audio source declared by the catalog, if any.
    #[serde(rename = "src", default, skip_serializing_if = "Option::is_none")]
    pub declared_source: Option<String>,
    #[serde(default)]
    pub section: Section,
}

impl TrackDescriptor {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, cover: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            cover_path: cover.into(),
            declared_source: None,
            section: Section::default(),
        }
    }

    pub fn with_source(mut self, src: impl Into<String>) -> Self {
        self.declared_source = Some(src.into());
        self
    }

    pub fn in_section(mut self, section: Section) -> Self {
        self.section = section;
        self
    }

    pub fn same_song(&self, title: &str, artist: &str) -> bool {
        self.title == title && self.artist == artist
    }

    /// "Artist - Title", or just the title when the artist is blank.
    pub fn display(&self) -> String {
        match self.artist.trim() {
            "" => self.title.clone(),
            a => format!("{} - {}", a, self.title),
        }
    }
}

/// A preview the lookup service knows about for a given song.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreviewEntry {
    pub title: String,
    pub artist: String,
    pub preview_url: Option<String>,
    pub album_cover: Option<String>,
}

/// Ordered track list plus the optional preview table shipped with it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tracks: Vec<TrackDescriptor>,
    #[serde(default)]
    pub previews: Vec<PreviewEntry>,
}

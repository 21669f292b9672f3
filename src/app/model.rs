//! Application model: the track list, the cursor and what the UI shows
//! about the player.

use crate::catalog::{Section, TrackDescriptor};
use crate::playback::{PlayerSnapshot, SnapshotHandle};
use crate::store::LikedSongs;

/// The main application model.
pub struct App {
    pub tracks: Vec<TrackDescriptor>,
    pub selected: usize,
    pub snapshot_handle: Option<SnapshotHandle>,
    pub liked: LikedSongs,

    /// Cursor jumps to the playing track when playback moves on.
    pub follow_playback: bool,
    pub details_window: bool,
    /// Where the track list came from, shown in the status box.
    pub source_label: Option<String>,
    /// One-line message shown in the status box until the next action.
    pub message: Option<String>,

    last_played: Option<usize>,
}

impl App {
    pub fn new(tracks: Vec<TrackDescriptor>, liked: LikedSongs) -> Self {
        Self {
            tracks,
            selected: 0,
            snapshot_handle: None,
            liked,
            follow_playback: true,
            details_window: false,
            source_label: None,
            message: None,
            last_played: None,
        }
    }

    pub fn set_snapshot_handle(&mut self, h: SnapshotHandle) {
        self.snapshot_handle = Some(h);
    }

    pub fn set_source_label(&mut self, label: impl Into<String>) {
        self.source_label = Some(label.into());
    }

    /// Latest player snapshot, if a player is attached.
    pub fn snapshot(&self) -> Option<PlayerSnapshot> {
        let h = self.snapshot_handle.as_ref()?;
        h.lock().ok().map(|s| s.clone())
    }

    pub fn toggle_details_window(&mut self) {
        self.details_window = !self.details_window;
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&TrackDescriptor> {
        self.tracks.get(self.selected)
    }

    pub fn set_selected(&mut self, idx: usize) {
        if self.has_tracks() {
            self.selected = idx.min(self.tracks.len() - 1);
        }
    }

    /// Move selection down, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            let len = self.tracks.len();
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the cursor onto the playing track when it changed since the
    /// last call and the cursor is following playback.
    pub fn follow(&mut self, snapshot: &PlayerSnapshot) {
        let playing = snapshot.state.track_index;
        if self.last_played == Some(playing) {
            return;
        }
        self.last_played = Some(playing);
        if self.follow_playback {
            self.set_selected(playing);
        }
    }

    pub fn is_liked(&self, idx: usize) -> bool {
        self.tracks
            .get(idx)
            .is_some_and(|t| self.liked.contains(t))
    }

    /// Like or unlike the selected track. Returns the new liked state.
    pub fn toggle_like_selected(&mut self) -> Option<bool> {
        let track = self.tracks.get(self.selected)?;
        Some(self.liked.toggle(track))
    }

    /// Section heading to print above `idx`, when it starts a new section.
    pub fn section_heading(&self, idx: usize) -> Option<&'static str> {
        let section = self.tracks.get(idx)?.section;
        let starts = idx == 0 || self.tracks[idx - 1].section != section;
        starts.then(|| match section {
            Section::Trending => "Trending",
            Section::Album => "Albums",
            Section::Row => "More for you",
        })
    }
}

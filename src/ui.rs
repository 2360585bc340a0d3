//! UI-facing boundary types.
//!
//! The actual front end (a windowed toolkit, a TUI, ...) lives outside this
//! crate. It reads the shared [`TransportSnapshot`](crate::player::TransportSnapshot)
//! handle, consumes the [`UiEvent`] stream, and produces
//! [`PlayerCmd`](crate::player::PlayerCmd) values. A minimal line-oriented
//! front end ships in `runtime::front`.

use uuid::Uuid;

/// One row of the playlist listing, safe for the caller to retain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRow {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub year: String,
    pub duration_display: String,
    pub id: Uuid,
}

/// Discrete events pushed to the front end on structural changes and failures.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// The playlist ordering or membership changed; a fresh row listing.
    PlaylistChanged(Vec<PlaylistRow>),
    /// A track started loading; metadata for the now-playing display.
    NowPlaying {
        title: String,
        album: String,
        artist: String,
    },
    /// Playback ended or was stopped; transport controls go inactive.
    TransportReset,
    /// A non-fatal load or decode failure, for a status notification.
    PlaybackError(String),
}

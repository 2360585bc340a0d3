//! The immutable track record.

use std::path::PathBuf;

use uuid::Uuid;

use crate::ui::PlaylistRow;

/// One playable item: display metadata plus playback timing constants.
///
/// Constructed by [`probe_track`](super::probe_track), never mutated, and
/// copied by value when handed across threads. The `id` is the stable key
/// used to reconcile entries across shuffle/unshuffle and removal.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: Uuid,
    pub title: String,
    pub album: String,
    pub artist: String,
    pub year: String,
    pub duration_ms: u64,
    /// Duration formatted as `mm:ss`.
    pub duration_display: String,
    pub path: PathBuf,
    pub file_size: u64,
    /// Number of decodable frames in the bitstream.
    pub frame_count: u64,
    /// Milliseconds of audio per frame; converts frame counts to time.
    pub ms_per_frame: f64,
}

impl Track {
    /// Total play time derived from the frame constants.
    pub fn total_ms(&self) -> u64 {
        (self.frame_count as f64 * self.ms_per_frame) as u64
    }

    /// Freshly allocated listing row; safe for the caller to retain.
    pub fn display_row(&self) -> PlaylistRow {
        PlaylistRow {
            title: self.title.clone(),
            album: self.album.clone(),
            artist: self.artist.clone(),
            year: self.year.clone(),
            duration_display: self.duration_display.clone(),
            id: self.id,
        }
    }
}

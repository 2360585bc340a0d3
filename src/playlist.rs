//! Playlist state machine.
//!
//! Pure data-structure logic: an ordered list of tracks with a current-track
//! cursor, a loop flag, and a reversible shuffle. No I/O happens here; the
//! transport controller serializes every mutation (see `player::controller`).
//!
//! While shuffled, the pre-shuffle ordering is retained in a shadow list and
//! reconciled by track id on unshuffle, so duplicate-looking tracks cannot
//! corrupt the restore.

use rand::seq::SliceRandom;
use rand::thread_rng;
use uuid::Uuid;

use crate::library::Track;
use crate::ui::PlaylistRow;

/// Result of [`Playlist::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The index was out of bounds; nothing changed.
    NotFound,
    /// A track other than the current one was removed.
    Removed,
    /// The track at the current cursor position was removed.
    CurrentRemoved,
}

#[derive(Default)]
pub struct Playlist {
    items: Vec<Track>,
    current_index: usize,
    looping: bool,
    shuffled: bool,
    /// Pre-shuffle ordering; non-empty iff `shuffled`.
    shadow: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the end of the list. While shuffled, the new track also
    /// joins the shadow order so unshuffle restores it; its shuffled
    /// position is simply the end of the list.
    pub fn add(&mut self, track: Track) {
        if self.shuffled {
            self.shadow.push(track.clone());
        }
        self.items.push(track);
    }

    /// Remove the track at `index`, shifting later entries left.
    ///
    /// Removing an entry below `current_index` does not shift the cursor,
    /// which silently re-points it at the following track. That matches the
    /// historical behavior this player reproduces; callers that care about
    /// cursor identity across removals must re-locate by id.
    pub fn remove(&mut self, index: usize) -> RemoveOutcome {
        if index >= self.items.len() {
            return RemoveOutcome::NotFound;
        }
        if self.shuffled {
            let id = self.items[index].id;
            self.shadow.retain(|t| t.id != id);
        }
        self.items.remove(index);
        if index == self.current_index {
            RemoveOutcome::CurrentRemoved
        } else {
            RemoveOutcome::Removed
        }
    }

    /// Copy of the track at `index`, or `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<Track> {
        self.items.get(index).cloned()
    }

    /// Position of the track with the given id.
    pub fn find_index(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Freshly allocated listing rows in current order; safe to retain.
    pub fn display_rows(&self) -> Vec<PlaylistRow> {
        self.items.iter().map(Track::display_row).collect()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// No-op when `index` is out of bounds.
    pub fn set_current_index(&mut self, index: usize) {
        if index < self.items.len() {
            self.current_index = index;
        }
    }

    /// Index of the track before the cursor, wrapping only when looping.
    pub fn previous_index(&self) -> usize {
        if self.current_index > 0 {
            self.current_index - 1
        } else if self.looping {
            self.items.len().saturating_sub(1)
        } else {
            0
        }
    }

    /// Index of the track after the cursor, wrapping only when looping.
    pub fn next_index(&self) -> usize {
        if self.current_index + 1 < self.items.len() {
            self.current_index + 1
        } else if self.looping {
            0
        } else {
            self.items.len().saturating_sub(1)
        }
    }

    pub fn has_next(&self) -> bool {
        !self.is_empty() && (self.looping || self.current_index + 1 < self.items.len())
    }

    pub fn has_previous(&self) -> bool {
        !self.is_empty() && (self.looping || self.current_index > 0)
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn toggle_loop(&mut self) {
        self.looping = !self.looping;
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Toggle between shuffled and as-added order.
    ///
    /// Enabling applies a uniform random permutation; with `keep_current`
    /// the current track is pinned to position 0 and the rest permuted.
    /// Disabling restores the shadow order and re-locates the cursor to the
    /// track that was current immediately before restoring, by id.
    /// `keep_current` has no effect when disabling.
    pub fn toggle_shuffle(&mut self, keep_current: bool) {
        if self.shuffled {
            let current_id = self.items.get(self.current_index).map(|t| t.id);
            self.items = std::mem::take(&mut self.shadow);
            if let Some(id) = current_id {
                if let Some(pos) = self.find_index(id) {
                    self.current_index = pos;
                }
            }
        } else {
            self.shadow = self.items.clone();
            if keep_current && !self.items.is_empty() {
                let cursor = self.current_index.min(self.items.len() - 1);
                let current = self.items.remove(cursor);
                self.items.shuffle(&mut thread_rng());
                self.items.insert(0, current);
            } else {
                self.items.shuffle(&mut thread_rng());
            }
            self.current_index = 0;
        }
        self.shuffled = !self.shuffled;
    }
}

#[cfg(test)]
mod tests;

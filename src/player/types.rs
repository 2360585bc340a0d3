//! Player command set, shared snapshot and per-engine control flags.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::library::Track;
use crate::playlist::Playlist;

/// Commands accepted by the transport controller. Each one executes
/// atomically with respect to the others; the front end only produces
/// values of this type.
#[derive(Debug)]
pub enum PlayerCmd {
    /// Stop whatever is playing and start the track at the given index.
    PlayNow(usize),
    /// Append a track to the playlist.
    Add(Track),
    /// Remove the track at the given index.
    Remove(usize),
    /// Move to the next track, or stop at the end of a non-looping playlist.
    Next,
    /// Move to the previous track when there is one.
    Previous,
    /// Toggle shuffled order; the current track is kept on top while playing.
    ToggleShuffle,
    /// Toggle playlist wraparound.
    ToggleLoop,
    /// Flip the engine's pause flag.
    TogglePause,
    /// Stop playback and release engine resources.
    Stop,
    /// Seek the loaded track to the given time. Ignored while scrubbing.
    Seek(u64),
    /// Pointer went down on the position scrubber at the given time.
    ScrubStart(u64),
    /// Pointer dragged to the given time; display follows, playback does not.
    ScrubMove(u64),
    /// Pointer released: commit the seek and resume normal time display.
    ScrubEnd(u64),
    /// Sent by the engine when a track ends on its own. Not a UI command.
    Advance,
    /// Sent by the engine when a track failed to load or play. The
    /// controller advances like [`PlayerCmd::Advance`] but gives up after a
    /// full cycle of consecutive failures. Not a UI command.
    AdvanceAfterFailure,
    /// Shut the controller down.
    Quit,
}

/// Coarse transport state as shown to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

/// Snapshot of the transport as the front end should render it, refreshed
/// on every frame-loop iteration while a track is loaded.
///
/// The `*_enabled` fields say whether a control is worth offering at all;
/// the `*_active` fields carry the current on/off state of the toggles.
#[derive(Debug, Clone, Default)]
pub struct TransportSnapshot {
    pub state: TransportState,
    pub position_ms: u64,
    pub total_ms: u64,
    pub next_enabled: bool,
    pub previous_enabled: bool,
    /// Loop and shuffle only make sense with more than one track.
    pub loop_enabled: bool,
    pub shuffle_enabled: bool,
    pub loop_active: bool,
    pub shuffle_active: bool,
}

pub type SnapshotHandle = Arc<Mutex<TransportSnapshot>>;

/// The single mutual-exclusion domain for playlist structure and the
/// current-track cursor.
pub type SharedPlaylist = Arc<Mutex<Playlist>>;

/// Sentinel meaning "no seek requested".
const NO_SEEK: u64 = u64::MAX;

/// Per-engine control flags.
///
/// The frame loop reads these once per iteration; they are deliberately
/// separate from the structural playlist lock so the loop's tight iteration
/// never contends with playlist mutation.
#[derive(Debug)]
pub struct PlaybackFlags {
    paused: AtomicBool,
    stopped: AtomicBool,
    scrubbing: AtomicBool,
    seek_request_ms: AtomicU64,
}

impl PlaybackFlags {
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            scrubbing: AtomicBool::new(false),
            seek_request_ms: AtomicU64::new(NO_SEEK),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn toggle_paused(&self) {
        self.paused.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Cooperative stop: the loop observes this at its next iteration
    /// boundary and exits after releasing resources.
    pub fn set_stopped(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing.load(Ordering::SeqCst)
    }

    pub fn set_scrubbing(&self) {
        self.scrubbing.store(true, Ordering::SeqCst);
    }

    pub fn clear_scrubbing(&self) {
        self.scrubbing.store(false, Ordering::SeqCst);
    }

    /// Post a seek target; a later request overwrites an unserviced one.
    pub fn request_seek(&self, target_ms: u64) {
        self.seek_request_ms
            .store(target_ms.min(NO_SEEK - 1), Ordering::SeqCst);
    }

    /// Take the pending seek target, if any.
    pub fn take_seek(&self) -> Option<u64> {
        let v = self.seek_request_ms.swap(NO_SEEK, Ordering::SeqCst);
        (v != NO_SEEK).then_some(v)
    }
}

impl Default for PlaybackFlags {
    fn default() -> Self {
        Self::new()
    }
}

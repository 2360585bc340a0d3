//! Transport controller.
//!
//! A single long-lived thread owns playback policy: it drains the command
//! channel and executes one command at a time, so structural operations
//! never interleave. Engine lifecycles are strictly sequential; the old
//! engine is joined before a new one is spawned.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::playlist::RemoveOutcome;
use crate::ui::UiEvent;

use super::engine::{self, EngineHandle};
use super::types::{PlayerCmd, SharedPlaylist, SnapshotHandle, TransportState};

pub(super) fn spawn(
    playlist: SharedPlaylist,
    snapshot: SnapshotHandle,
    ui_tx: Sender<UiEvent>,
    buffer_ms: u64,
) -> (Sender<PlayerCmd>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let controller = Controller {
        playlist,
        snapshot,
        ui_tx,
        cmd_tx: cmd_tx.clone(),
        buffer_ms,
        engine: None,
        failure_streak: 0,
    };
    let thread = thread::spawn(move || controller.run(cmd_rx));
    (cmd_tx, thread)
}

struct Controller {
    playlist: SharedPlaylist,
    snapshot: SnapshotHandle,
    ui_tx: Sender<UiEvent>,
    /// Handed to each engine so it can post `Advance` back to us.
    cmd_tx: Sender<PlayerCmd>,
    buffer_ms: u64,
    engine: Option<EngineHandle>,
    /// Consecutive engine failures since the last successful playback or
    /// user command; bounds the retry chain to one full playlist cycle.
    failure_streak: usize,
}

impl Controller {
    fn run(mut self, cmd_rx: Receiver<PlayerCmd>) {
        while let Ok(cmd) = cmd_rx.recv() {
            debug!(?cmd, "transport command");
            match cmd {
                PlayerCmd::PlayNow(index) => self.play_now(index),
                PlayerCmd::Add(track) => self.add(track),
                PlayerCmd::Remove(index) => self.remove(index),
                PlayerCmd::Next => self.next(),
                PlayerCmd::Previous => self.previous(),
                PlayerCmd::ToggleShuffle => self.toggle_shuffle(),
                PlayerCmd::ToggleLoop => self.toggle_loop(),
                PlayerCmd::TogglePause => self.toggle_pause(),
                PlayerCmd::Stop => self.stop(),
                PlayerCmd::Seek(ms) => self.seek(ms),
                PlayerCmd::ScrubStart(ms) => self.scrub_start(ms),
                PlayerCmd::ScrubMove(ms) => self.scrub_move(ms),
                PlayerCmd::ScrubEnd(ms) => self.scrub_end(ms),
                PlayerCmd::Advance => self.advance(),
                PlayerCmd::AdvanceAfterFailure => self.advance_after_failure(),
                PlayerCmd::Quit => break,
            }
        }
        self.teardown_engine();
        info!("transport controller stopped");
    }

    /// Join the current engine, if any. Safe to call when none is running.
    fn teardown_engine(&mut self) {
        if let Some(engine) = self.engine.take() {
            engine.stop_and_join();
        }
    }

    /// Start playing the track at `index`, tearing down any current engine
    /// first. No-op when the index is out of range.
    fn start(&mut self, index: usize) {
        self.teardown_engine();

        let track = {
            let Ok(mut pl) = self.playlist.lock() else { return };
            pl.set_current_index(index);
            pl.get(index)
        };
        let Some(track) = track else {
            self.reset_transport();
            return;
        };

        let _ = self.ui_tx.send(UiEvent::NowPlaying {
            title: track.title.clone(),
            album: track.album.clone(),
            artist: track.artist.clone(),
        });

        self.engine = Some(engine::spawn(
            track,
            self.playlist.clone(),
            self.snapshot.clone(),
            self.cmd_tx.clone(),
            self.ui_tx.clone(),
            self.buffer_ms,
        ));
    }

    fn play_now(&mut self, index: usize) {
        self.failure_streak = 0;
        let valid = self
            .playlist
            .lock()
            .map(|pl| index < pl.len())
            .unwrap_or(false);
        if valid {
            self.start(index);
        }
    }

    fn add(&mut self, track: crate::library::Track) {
        let rows = {
            let Ok(mut pl) = self.playlist.lock() else { return };
            pl.add(track);
            pl.display_rows()
        };
        self.refresh_flags();
        let _ = self.ui_tx.send(UiEvent::PlaylistChanged(rows));
    }

    fn remove(&mut self, index: usize) {
        let was_playing = self.engine.is_some();
        let (outcome, rows) = {
            let Ok(mut pl) = self.playlist.lock() else { return };
            (pl.remove(index), pl.display_rows())
        };
        match outcome {
            RemoveOutcome::NotFound => return,
            RemoveOutcome::CurrentRemoved => {
                // Only interrupt when a successor is reachable; removing the
                // current last track (loop off) lets it play to its natural
                // end. The successor sits at the unchanged cursor.
                let (has_next, succ) = {
                    let Ok(pl) = self.playlist.lock() else { return };
                    (
                        pl.has_next(),
                        (pl.current_index() < pl.len()).then(|| pl.current_index()),
                    )
                };
                if has_next {
                    self.stop();
                    if was_playing {
                        if let Some(index) = succ {
                            self.start(index);
                        }
                    }
                }
            }
            RemoveOutcome::Removed => {}
        }
        self.refresh_flags();
        let _ = self.ui_tx.send(UiEvent::PlaylistChanged(rows));
    }

    /// Move to the next track, or stop at the end of a non-looping playlist.
    fn next(&mut self) {
        self.failure_streak = 0;
        self.advance();
    }

    fn previous(&mut self) {
        self.failure_streak = 0;
        let target = {
            let Ok(pl) = self.playlist.lock() else { return };
            pl.has_previous().then(|| pl.previous_index())
        };
        if let Some(index) = target {
            self.start(index);
        }
    }

    fn toggle_shuffle(&mut self) {
        // While something is playing the current track stays on top so the
        // listening order is not yanked out from under the listener.
        let keep_current = self.engine.is_some();
        let rows = {
            let Ok(mut pl) = self.playlist.lock() else { return };
            pl.toggle_shuffle(keep_current);
            pl.display_rows()
        };
        self.refresh_flags();
        let _ = self.ui_tx.send(UiEvent::PlaylistChanged(rows));
    }

    fn toggle_loop(&mut self) {
        if let Ok(mut pl) = self.playlist.lock() {
            pl.toggle_loop();
        }
        self.refresh_flags();
    }

    fn toggle_pause(&mut self) {
        if let Some(engine) = &self.engine {
            engine.flags.toggle_paused();
        }
    }

    fn stop(&mut self) {
        self.teardown_engine();
        self.reset_transport();
    }

    /// Direct seek; suppressed while a scrub gesture is in progress, whose
    /// release will carry the authoritative target.
    fn seek(&mut self, target_ms: u64) {
        if let Some(engine) = &self.engine {
            if !engine.flags.is_scrubbing() {
                engine.flags.request_seek(target_ms);
            }
        }
    }

    fn scrub_start(&mut self, target_ms: u64) {
        if let Some(engine) = &self.engine {
            engine.flags.set_scrubbing();
        }
        self.show_scrub_position(target_ms);
    }

    fn scrub_move(&mut self, target_ms: u64) {
        self.show_scrub_position(target_ms);
    }

    /// Commit the gesture. The engine clears the scrubbing flag itself once
    /// the seek is applied, so the display never snaps back to the old
    /// position in between.
    fn scrub_end(&mut self, target_ms: u64) {
        if let Some(engine) = &self.engine {
            engine.flags.request_seek(target_ms);
        }
    }

    fn advance(&mut self) {
        self.failure_streak = 0;
        let target = {
            let Ok(pl) = self.playlist.lock() else { return };
            pl.has_next().then(|| pl.next_index())
        };
        match target {
            Some(index) => self.start(index),
            None => self.stop(),
        }
    }

    /// Like a natural-end advance, except a full cycle of back-to-back
    /// failures stops the transport instead of spinning through the
    /// playlist forever (worst case with loop on).
    fn advance_after_failure(&mut self) {
        self.failure_streak += 1;
        let len = self.playlist.lock().map(|pl| pl.len()).unwrap_or(0);
        if self.failure_streak >= len.max(1) {
            warn!(
                failures = self.failure_streak,
                "every candidate track failed; stopping"
            );
            self.failure_streak = 0;
            self.stop();
            return;
        }
        let target = {
            let Ok(pl) = self.playlist.lock() else { return };
            pl.has_next().then(|| pl.next_index())
        };
        match target {
            Some(index) => self.start(index),
            None => {
                self.failure_streak = 0;
                self.stop();
            }
        }
    }

    /// While scrubbing the displayed position follows the pointer, not the
    /// audio.
    fn show_scrub_position(&self, target_ms: u64) {
        if let Ok(mut snap) = self.snapshot.lock() {
            snap.position_ms = target_ms.min(snap.total_ms);
        }
    }

    /// Re-derive the enablement flags after a structural change.
    fn refresh_flags(&self) {
        let Ok(pl) = self.playlist.lock() else { return };
        let Ok(mut snap) = self.snapshot.lock() else { return };
        snap.next_enabled = pl.has_next();
        snap.previous_enabled = pl.has_previous();
        snap.loop_enabled = pl.len() > 1;
        snap.shuffle_enabled = pl.len() > 1;
        snap.loop_active = pl.is_looping();
        snap.shuffle_active = pl.is_shuffled();
    }

    fn reset_transport(&self) {
        {
            let Ok(pl) = self.playlist.lock() else { return };
            let Ok(mut snap) = self.snapshot.lock() else { return };
            snap.state = TransportState::Idle;
            snap.position_ms = 0;
            snap.total_ms = 0;
            snap.next_enabled = pl.has_next();
            snap.previous_enabled = pl.has_previous();
            snap.loop_enabled = pl.len() > 1;
            snap.shuffle_enabled = pl.len() > 1;
            snap.loop_active = pl.is_looping();
            snap.shuffle_active = pl.is_shuffled();
        }
        let _ = self.ui_tx.send(UiEvent::TransportReset);
    }
}

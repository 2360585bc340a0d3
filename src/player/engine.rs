//! Per-track playback engine.
//!
//! One engine thread exists per loaded track and exits when the track ends,
//! fails, or is stopped. The controller enforces strict succession: it joins
//! the old engine before spawning the next, so two engines never write to
//! the device at once.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::library::Track;
use crate::ui::UiEvent;

use super::decode::DecodeStream;
use super::output::AudioDevice;
use super::types::{PlaybackFlags, PlayerCmd, SharedPlaylist, SnapshotHandle, TransportState};

/// How often the loop re-checks its flags while paused.
const PAUSE_POLL: Duration = Duration::from_millis(50);

pub(super) struct EngineHandle {
    pub(super) flags: Arc<PlaybackFlags>,
    thread: JoinHandle<()>,
}

impl EngineHandle {
    /// Request a cooperative stop and wait for the engine to release the
    /// stream and device.
    pub(super) fn stop_and_join(self) {
        self.flags.set_stopped();
        if self.thread.join().is_err() {
            warn!("engine thread panicked");
        }
    }
}

/// How the frame loop ended.
enum LoopExit {
    /// The stream ran out of frames on its own.
    Finished,
    /// The stop flag was raised.
    Stopped,
    Failed(PlayerError),
}

pub(super) fn spawn(
    track: Track,
    playlist: SharedPlaylist,
    snapshot: SnapshotHandle,
    cmd_tx: Sender<PlayerCmd>,
    ui_tx: Sender<UiEvent>,
    buffer_ms: u64,
) -> EngineHandle {
    let flags = Arc::new(PlaybackFlags::new());
    let thread_flags = Arc::clone(&flags);
    let thread = thread::spawn(move || {
        run(track, playlist, snapshot, thread_flags, cmd_tx, ui_tx, buffer_ms);
    });
    EngineHandle { flags, thread }
}

fn run(
    track: Track,
    playlist: SharedPlaylist,
    snapshot: SnapshotHandle,
    flags: Arc<PlaybackFlags>,
    cmd_tx: Sender<PlayerCmd>,
    ui_tx: Sender<UiEvent>,
    buffer_ms: u64,
) {
    info!(title = %track.title, path = %track.path.display(), "loading track");
    publish(&playlist, &snapshot, TransportState::Loading, 0, track.total_ms());

    let loaded = DecodeStream::open(&track.path).and_then(|stream| {
        let device = AudioDevice::open(stream.sample_rate(), stream.channels(), buffer_ms)?;
        Ok((stream, device))
    });
    let (stream, device) = match loaded {
        Ok(pair) => pair,
        Err(e) => {
            warn!(title = %track.title, "load failed: {e}");
            let _ = ui_tx.send(UiEvent::PlaybackError(e.to_string()));
            if !flags.is_stopped() {
                let _ = cmd_tx.send(PlayerCmd::AdvanceAfterFailure);
            }
            return;
        }
    };

    let exit = frame_loop(&track, stream, &device, &playlist, &snapshot, &flags);
    device.close();

    match exit {
        LoopExit::Finished => {
            debug!(title = %track.title, "track finished");
            let _ = cmd_tx.send(PlayerCmd::Advance);
        }
        LoopExit::Stopped => {}
        LoopExit::Failed(e) => {
            warn!(title = %track.title, "playback failed: {e}");
            let _ = ui_tx.send(UiEvent::PlaybackError(e.to_string()));
            if !flags.is_stopped() {
                let _ = cmd_tx.send(PlayerCmd::AdvanceAfterFailure);
            }
        }
    }
}

fn frame_loop(
    track: &Track,
    mut stream: DecodeStream,
    device: &AudioDevice,
    playlist: &SharedPlaylist,
    snapshot: &SnapshotHandle,
    flags: &Arc<PlaybackFlags>,
) -> LoopExit {
    let total_ms = track.total_ms();
    let mut frames_played: u64 = 0;

    loop {
        if flags.is_stopped() {
            return LoopExit::Stopped;
        }

        if let Some(target_ms) = flags.take_seek() {
            match seek(&mut stream, frames_played, target_ms, track, flags) {
                Ok(Some(frame)) => frames_played = frame,
                Ok(None) => {
                    flags.clear_scrubbing();
                    device.drain();
                    return LoopExit::Finished;
                }
                Err(e) => {
                    flags.clear_scrubbing();
                    return LoopExit::Failed(e);
                }
            }
            flags.clear_scrubbing();
        }

        if flags.is_paused() {
            paused_tick(
                playlist,
                snapshot,
                flags,
                position_ms(frames_played, track.ms_per_frame),
                total_ms,
            );
            thread::sleep(PAUSE_POLL);
            continue;
        }

        match stream.next_frame() {
            Ok(Some(frame)) => {
                // Blocking write against the bounded queue paces the loop.
                if !device.write(&frame) {
                    return LoopExit::Stopped;
                }
                frames_played += 1;
                if !flags.is_scrubbing() {
                    publish(
                        playlist,
                        snapshot,
                        TransportState::Playing,
                        position_ms(frames_played, track.ms_per_frame),
                        total_ms,
                    );
                }
            }
            Ok(None) => {
                device.drain();
                return LoopExit::Finished;
            }
            Err(e) => return LoopExit::Failed(e),
        }
    }
}

/// Move the stream to the frame containing `target_ms`.
///
/// Forward seeks skip frames in place; backward seeks reopen the stream and
/// skip forward from frame zero, which is exact at the cost of re-reading
/// the head of the file. Only the decode stream is reopened: the output
/// device holds no stream position, so it stays up across the seek.
/// `Ok(None)` means the target lies at or past the end of the stream.
fn seek(
    stream: &mut DecodeStream,
    frames_played: u64,
    target_ms: u64,
    track: &Track,
    flags: &Arc<PlaybackFlags>,
) -> Result<Option<u64>> {
    let target = target_frame(target_ms, track.ms_per_frame, track.frame_count);
    debug!(target_ms, target, frames_played, "seek");

    let mut at = if target < frames_played {
        *stream = DecodeStream::open(stream.path())?;
        0
    } else {
        frames_played
    };

    while at < target {
        if flags.is_stopped() {
            break;
        }
        if !stream.skip_frame()? {
            return Ok(None);
        }
        at += 1;
    }
    Ok(Some(at))
}

/// Frame index holding `target_ms`, clamped to the last frame.
fn target_frame(target_ms: u64, ms_per_frame: f64, frame_count: u64) -> u64 {
    if ms_per_frame <= 0.0 {
        return 0;
    }
    let frame = (target_ms as f64 / ms_per_frame) as u64;
    frame.min(frame_count.saturating_sub(1))
}

fn position_ms(frames_played: u64, ms_per_frame: f64) -> u64 {
    (frames_played as f64 * ms_per_frame) as u64
}

/// Paused iterations keep refreshing the snapshot so enablement stays
/// current, but never while a scrub gesture owns the position display.
fn paused_tick(
    playlist: &SharedPlaylist,
    snapshot: &SnapshotHandle,
    flags: &PlaybackFlags,
    position_ms: u64,
    total_ms: u64,
) {
    if flags.is_scrubbing() {
        return;
    }
    publish(playlist, snapshot, TransportState::Paused, position_ms, total_ms);
}

/// Refresh the shared snapshot. Locks the playlist before the snapshot;
/// every writer follows that order.
fn publish(
    playlist: &SharedPlaylist,
    snapshot: &SnapshotHandle,
    state: TransportState,
    position_ms: u64,
    total_ms: u64,
) {
    let Ok(pl) = playlist.lock() else { return };
    let Ok(mut snap) = snapshot.lock() else { return };
    snap.state = state;
    snap.position_ms = position_ms;
    snap.total_ms = total_ms;
    snap.next_enabled = pl.has_next();
    snap.previous_enabled = pl.has_previous();
    snap.loop_enabled = pl.len() > 1;
    snap.shuffle_enabled = pl.len() > 1;
    snap.loop_active = pl.is_looping();
    snap.shuffle_active = pl.is_shuffled();
}

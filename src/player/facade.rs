//! Public handle to the transport controller.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::warn;

use crate::playlist::Playlist;
use crate::ui::UiEvent;

use super::controller;
use super::types::{PlayerCmd, SharedPlaylist, SnapshotHandle, TransportSnapshot};

/// Owning handle over the controller thread. Dropping the player shuts the
/// controller (and any running engine) down.
pub struct Player {
    cmd_tx: Sender<PlayerCmd>,
    controller: Option<JoinHandle<()>>,
    playlist: SharedPlaylist,
    snapshot: SnapshotHandle,
}

impl Player {
    /// Start a controller with an empty playlist. The returned receiver
    /// carries the [`UiEvent`] stream for the front end.
    pub fn new(buffer_ms: u64) -> (Self, Receiver<UiEvent>) {
        let playlist: SharedPlaylist = Arc::new(Mutex::new(Playlist::new()));
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(TransportSnapshot::default()));
        let (ui_tx, ui_rx) = std::sync::mpsc::channel();

        let (cmd_tx, controller) =
            controller::spawn(playlist.clone(), snapshot.clone(), ui_tx, buffer_ms);

        (
            Self {
                cmd_tx,
                controller: Some(controller),
                playlist,
                snapshot,
            },
            ui_rx,
        )
    }

    /// Queue a command; the controller executes them strictly in order.
    pub fn send(&self, cmd: PlayerCmd) {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("transport controller is gone; command dropped");
        }
    }

    /// Shared playlist handle, for read-side listing. All mutation goes
    /// through [`Player::send`].
    pub fn playlist(&self) -> SharedPlaylist {
        self.playlist.clone()
    }

    /// Shared transport snapshot, refreshed by the engine while playing.
    pub fn snapshot(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCmd::Quit);
        if let Some(controller) = self.controller.take() {
            if controller.join().is_err() {
                warn!("controller thread panicked during shutdown");
            }
        }
    }
}

//! Playback engine, transport controller and their shared types.
//!
//! The controller serializes every command on one long-lived thread; the
//! engine runs the per-track frame loop on its own thread and is controlled
//! through atomic flags plus a seek mailbox read once per iteration.

mod controller;
mod decode;
mod engine;
mod facade;
mod output;
mod types;

pub use facade::Player;
pub use types::{PlayerCmd, SharedPlaylist, SnapshotHandle, TransportSnapshot, TransportState};

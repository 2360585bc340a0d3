//! Player error types.
//!
//! Load and decode failures are reported upward as events and never
//! terminate the process; see the engine and controller for the policy.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// The track's byte source is missing at load time.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// The container holds nothing we can decode.
    #[error("no decodable audio track in {0}")]
    NoAudioTrack(PathBuf),

    /// Malformed or corrupt data in the bitstream.
    #[error("decode error: {0}")]
    Decode(String),

    /// Audio output unavailable or misbehaving.
    #[error("audio device error: {0}")]
    Device(String),
}

impl From<symphonia::core::errors::Error> for PlayerError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        PlayerError::Decode(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for PlayerError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        PlayerError::Device(err.to_string())
    }
}

impl From<cpal::BuildStreamError> for PlayerError {
    fn from(err: cpal::BuildStreamError) -> Self {
        PlayerError::Device(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for PlayerError {
    fn from(err: cpal::PlayStreamError) -> Self {
        PlayerError::Device(err.to_string())
    }
}

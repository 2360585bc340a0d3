//! Frame-granular decode stream over a local audio file.
//!
//! One frame is one compressed packet's worth of interleaved `f32` samples.
//! The engine pulls frames one at a time so it can observe its control flags
//! between frames; seeking backward is done by reopening the stream and
//! skipping forward from the start.

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{PlayerError, Result};

pub(super) struct DecodeStream {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    path: PathBuf,
}

impl DecodeStream {
    /// Probe the container, pick the first real audio track and build its
    /// decoder.
    pub(super) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlayerError::FileNotFound(path.to_path_buf()),
            _ => PlayerError::Decode(e.to_string()),
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|_| PlayerError::NoAudioTrack(path.to_path_buf()))?;

        let format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlayerError::NoAudioTrack(path.to_path_buf()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| PlayerError::Decode("unknown sample rate".into()))?;
        let channels = track
            .codec_params
            .channels
            .ok_or_else(|| PlayerError::Decode("unknown channel layout".into()))?
            .count();

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;

        Ok(Self {
            track_id: track.id,
            sample_rate,
            channels,
            format,
            decoder,
            path: path.to_path_buf(),
        })
    }

    pub(super) fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub(super) fn channels(&self) -> usize {
        self.channels
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the next frame into interleaved `f32` samples.
    ///
    /// `Ok(None)` means the stream ended cleanly. A corrupt packet is a hard
    /// error; the engine reports it and moves on to the next track rather
    /// than playing through garbage.
    pub(super) fn next_frame(&mut self) -> Result<Option<Vec<f32>>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = self
                .decoder
                .decode(&packet)
                .map_err(|e| PlayerError::Decode(e.to_string()))?;

            let mut buf = SampleBuffer::<f32>::new(decoded.frames() as u64, *decoded.spec());
            buf.copy_interleaved_ref(decoded);
            return Ok(Some(buf.samples().to_vec()));
        }
    }

    /// Advance past one frame without rendering it. Returns `false` at end
    /// of stream.
    pub(super) fn skip_frame(&mut self) -> Result<bool> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(false);
                }
                Err(SymphoniaError::ResetRequired) => return Ok(false),
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() == self.track_id {
                return Ok(true);
            }
        }
    }
}

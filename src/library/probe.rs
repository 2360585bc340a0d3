//! Builds immutable [`Track`] records from on-disk files.
//!
//! Tags and duration come from lofty; the frame timing constants come from a
//! symphonia probe of the container (one packet is one frame).

use std::fs::{self, File};
use std::path::Path;

use lofty::{AudioFile, ItemKey, TaggedFileExt};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use uuid::Uuid;

use crate::error::{PlayerError, Result};

use super::display::format_mmss;
use super::model::Track;

/// Inspect `path` and build its [`Track`] record.
///
/// Fails with [`PlayerError::FileNotFound`] when the file is missing and
/// [`PlayerError::NoAudioTrack`] when nothing decodable is inside.
pub fn probe_track(path: &Path) -> Result<Track> {
    let file_size = fs::metadata(path)
        .map_err(|_| PlayerError::FileNotFound(path.to_path_buf()))?
        .len();

    let default_title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let mut title = default_title;
    let mut album = String::new();
    let mut artist = String::new();
    let mut year = String::new();
    let mut duration_ms: u64 = 0;

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration_ms = tagged.properties().duration().as_millis() as u64;

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                if !v.trim().is_empty() {
                    title = v.to_string();
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                album = v.trim().to_string();
            }
            if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                artist = v.trim().to_string();
            }
            if let Some(v) = tag.get_string(&ItemKey::Year) {
                year = v.trim().to_string();
            }
        }
    }

    let (mut frame_count, ms_per_frame) = frame_timing(path)?;
    if duration_ms == 0 {
        duration_ms = (frame_count as f64 * ms_per_frame) as u64;
    }
    if frame_count == 0 && ms_per_frame > 0.0 {
        // Container did not report a total sample count.
        frame_count = (duration_ms as f64 / ms_per_frame).ceil() as u64;
    }

    Ok(Track {
        id: Uuid::new_v4(),
        title,
        album,
        artist,
        year,
        duration_ms,
        duration_display: format_mmss(duration_ms),
        path: path.to_path_buf(),
        file_size,
        frame_count,
        ms_per_frame,
    })
}

/// Determine `(frame_count, ms_per_frame)` for the file at `path`.
///
/// The per-frame duration comes from the first packet's timebase length; the
/// frame count from the codec's total sample count when it reports one.
fn frame_timing(path: &Path) -> Result<(u64, f64)> {
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

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlayerError::NoAudioTrack(path.to_path_buf()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| PlayerError::NoAudioTrack(path.to_path_buf()))?;
    let total_samples = track.codec_params.n_frames;
    let track_id = track.id;

    // Samples per frame, read off the first packet of the stream.
    let mut samples_per_frame: u64 = 0;
    loop {
        match format.next_packet() {
            Ok(packet) => {
                if packet.track_id() == track_id && packet.dur > 0 {
                    samples_per_frame = packet.dur;
                    break;
                }
            }
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        }
    }
    if samples_per_frame == 0 {
        return Err(PlayerError::NoAudioTrack(path.to_path_buf()));
    }

    let ms_per_frame = samples_per_frame as f64 * 1000.0 / sample_rate as f64;
    let frame_count = total_samples
        .map(|n| n.div_ceil(samples_per_frame))
        .unwrap_or(0);

    Ok((frame_count, ms_per_frame))
}

//! Shared test fixtures.

use std::fs;
use std::path::Path;

/// Write a 16-bit PCM mono WAV file with the given samples.
pub(crate) fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
    let data_len = samples.len() * 2;
    let mut bytes = Vec::with_capacity(44 + data_len);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(data_len as u32).to_le_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    fs::write(path, bytes).unwrap();
}

/// Write `seconds` of silence at 8 kHz.
pub(crate) fn write_silent_wav(path: &Path, seconds: u32) {
    let sample_rate = 8_000;
    let samples = vec![0i16; (sample_rate * seconds) as usize];
    write_wav(path, sample_rate, &samples);
}

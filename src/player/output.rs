//! Audio device output stage.
//!
//! A bounded sample queue sits between the engine thread and the real-time
//! device callback. The engine's blocking `write` is what paces the frame
//! loop: once the queue holds `buffer_ms` worth of samples, `write` blocks
//! until the callback drains room, so decode proceeds at playback speed.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::warn;

use crate::error::{PlayerError, Result};

/// Bounded interleaved `f32` queue. One producer (the engine), one consumer
/// (the device callback).
struct SampleQueue {
    inner: Mutex<QueueState>,
    cv: Condvar,
    capacity: usize,
}

struct QueueState {
    buf: VecDeque<f32>,
    closed: bool,
}

impl SampleQueue {
    fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(QueueState {
                buf: VecDeque::new(),
                closed: false,
            }),
            cv: Condvar::new(),
            capacity: capacity.max(1),
        }
    }

    /// Push samples, blocking while the queue is full. Returns `false` when
    /// the queue was closed before everything could be enqueued.
    fn push_blocking(&self, samples: &[f32]) -> bool {
        let mut offset = 0;
        while offset < samples.len() {
            let mut state = match self.inner.lock() {
                Ok(g) => g,
                Err(_) => return false,
            };
            while state.buf.len() >= self.capacity && !state.closed {
                state = match self.cv.wait(state) {
                    Ok(g) => g,
                    Err(_) => return false,
                };
            }
            if state.closed {
                return false;
            }
            while offset < samples.len() && state.buf.len() < self.capacity {
                state.buf.push_back(samples[offset]);
                offset += 1;
            }
            drop(state);
            self.cv.notify_all();
        }
        true
    }

    /// Non-blocking pop for the real-time callback; returns how many samples
    /// were written into `out`, zero-filling is the caller's business.
    fn pop_into(&self, out: &mut [f32]) -> usize {
        let mut state = match self.inner.lock() {
            Ok(g) => g,
            Err(_) => return 0,
        };
        let take = out.len().min(state.buf.len());
        for slot in out.iter_mut().take(take) {
            *slot = state.buf.pop_front().unwrap_or(0.0);
        }
        drop(state);
        if take > 0 {
            self.cv.notify_all();
        }
        take
    }

    /// Idempotent. Wakes every waiter; pushes after this are refused.
    fn close(&self) {
        if let Ok(mut state) = self.inner.lock() {
            state.closed = true;
        }
        self.cv.notify_all();
    }

    /// Block until the callback has consumed everything, or the queue was
    /// closed underneath us.
    fn wait_empty(&self) {
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        while !state.buf.is_empty() && !state.closed {
            state = match self.cv.wait_timeout(state, Duration::from_millis(50)) {
                Ok((g, _)) => g,
                Err(_) => return,
            };
        }
    }
}

/// An open output stream on the default audio device.
///
/// Lives entirely on the engine thread; the cpal stream keeps playing from
/// the shared queue until [`AudioDevice::close`] is called or the device is
/// dropped.
pub(super) struct AudioDevice {
    queue: Arc<SampleQueue>,
    stream: cpal::Stream,
}

impl AudioDevice {
    /// Open the default output device at the track's sample rate. The queue
    /// capacity is sized to hold `buffer_ms` of source audio.
    pub(super) fn open(sample_rate: u32, src_channels: usize, buffer_ms: u64) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlayerError::Device("no default output device".into()))?;
        let default_config = device.default_output_config()?;
        let sample_format = default_config.sample_format();
        let out_channels = default_config.channels() as usize;

        let config = cpal::StreamConfig {
            channels: out_channels as u16,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity =
            (sample_rate as u64 * buffer_ms / 1000).max(1) as usize * src_channels;
        let queue = Arc::new(SampleQueue::new(capacity));

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, &queue, src_channels)?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, &queue, src_channels)?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, &queue, src_channels)?
            }
            other => {
                return Err(PlayerError::Device(format!(
                    "unsupported sample format: {other:?}"
                )));
            }
        };
        stream.play()?;

        Ok(Self { queue, stream })
    }

    /// Hand one frame of interleaved source samples to the device, blocking
    /// while the queue is full. Returns `false` once the device was closed.
    pub(super) fn write(&self, samples: &[f32]) -> bool {
        self.queue.push_blocking(samples)
    }

    /// Let the buffered tail play out. Used at natural end of stream so the
    /// last frames are not cut off.
    pub(super) fn drain(&self) {
        self.queue.wait_empty();
    }

    /// Stop output immediately and discard whatever is still buffered.
    pub(super) fn close(&self) {
        self.queue.close();
        if let Err(e) = self.stream.pause() {
            warn!("failed to pause output stream: {e}");
        }
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.queue.close();
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    queue: &Arc<SampleQueue>,
    src_channels: usize,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
{
    let out_channels = config.channels as usize;
    let queue_cb = Arc::clone(queue);
    let queue_err = Arc::clone(queue);
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let frames = data.len() / out_channels.max(1);
            scratch.clear();
            scratch.resize(frames * src_channels, 0.0);
            let got = queue_cb.pop_into(&mut scratch);
            scratch.truncate(got - got % src_channels.max(1));

            for (frame, chunk) in data.chunks_mut(out_channels).enumerate() {
                let src_frame = frame * src_channels;
                for (ch, slot) in chunk.iter_mut().enumerate() {
                    let sample = sample_for(&scratch, src_frame, src_channels, out_channels, ch);
                    *slot = <T as cpal::Sample>::from_sample::<f32>(sample);
                }
            }
        },
        move |err| {
            // A dead stream stops draining; closing the queue unblocks the
            // engine's write so its loop can exit instead of hanging.
            warn!("output stream error: {err}");
            queue_err.close();
        },
        None,
    )?;
    Ok(stream)
}

/// Map a source frame onto an output channel: mono is duplicated, stereo is
/// averaged down to mono, anything else clamps to the available channels.
/// Underruns read past `src` and come out as silence.
fn sample_for(
    src: &[f32],
    src_frame: usize,
    src_channels: usize,
    out_channels: usize,
    out_ch: usize,
) -> f32 {
    let get = |ch: usize| src.get(src_frame + ch).copied().unwrap_or(0.0);
    match (src_channels, out_channels) {
        (0, _) => 0.0,
        (1, _) => get(0),
        (2, 1) => 0.5 * (get(0) + get(1)),
        (2, _) => get(out_ch.min(1)),
        (n, _) => get(out_ch.min(n - 1)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::{sample_for, SampleQueue};

    #[test]
    fn closing_the_queue_unblocks_a_full_writer() {
        let queue = Arc::new(SampleQueue::new(4));
        assert!(queue.push_blocking(&[0.0; 4]));

        let writer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.push_blocking(&[1.0; 8]))
        };
        thread::sleep(Duration::from_millis(50));
        queue.close();

        // Without the close this join would hang forever.
        assert!(!writer.join().unwrap());
    }

    #[test]
    fn push_after_close_is_refused() {
        let queue = SampleQueue::new(16);
        queue.close();
        assert!(!queue.push_blocking(&[0.5; 4]));
    }

    #[test]
    fn pop_hands_back_samples_in_order() {
        let queue = SampleQueue::new(16);
        assert!(queue.push_blocking(&[1.0, 2.0, 3.0]));

        let mut out = [0.0f32; 2];
        assert_eq!(queue.pop_into(&mut out), 2);
        assert_eq!(out, [1.0, 2.0]);
        assert_eq!(queue.pop_into(&mut out), 1);
        assert_eq!(out[0], 3.0);
        assert_eq!(queue.pop_into(&mut out), 0);
    }

    #[test]
    fn wait_empty_returns_once_drained_or_closed() {
        let queue = Arc::new(SampleQueue::new(16));
        assert!(queue.push_blocking(&[0.0; 8]));

        let drainer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                let mut out = [0.0f32; 8];
                queue.pop_into(&mut out);
            })
        };
        queue.wait_empty();
        drainer.join().unwrap();

        let queue = SampleQueue::new(4);
        assert!(queue.push_blocking(&[0.0; 4]));
        queue.close();
        // Closed counts as done even with samples left behind.
        queue.wait_empty();
    }

    #[test]
    fn channel_mapping_duplicates_mono_and_averages_stereo() {
        let src = [0.2f32, 0.8];
        // mono -> stereo duplicates.
        assert_eq!(sample_for(&src, 0, 1, 2, 0), 0.2);
        assert_eq!(sample_for(&src, 0, 1, 2, 1), 0.2);
        // stereo -> mono averages.
        assert!((sample_for(&src, 0, 2, 1, 0) - 0.5).abs() < 1e-6);
        // stereo -> stereo passes through.
        assert_eq!(sample_for(&src, 0, 2, 2, 1), 0.8);
        // underrun is silence.
        assert_eq!(sample_for(&src, 2, 2, 2, 0), 0.0);
    }
}

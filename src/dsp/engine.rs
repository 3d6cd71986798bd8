//! # Delay Engine
//!
//! The engine turns the ring buffer into an echo. Every block it:
//!
//! 1. **Writes** each channel's input into the ring buffer, starting at
//!    the write cursor.
//! 2. **Converts** the delay time to a whole number of samples:
//!    `round(delay_ms * sample_rate / 1000)`, clamped to the buffer.
//! 3. **Reads** the history `delay_samples` behind the write cursor,
//!    scales it by the feedback gain and adds it onto the output (which
//!    still holds the dry input). The same wet value is added onto the
//!    history cell just written, so the buffer holds what was heard and
//!    the next pass around the loop echoes the echo.
//! 4. **Advances** the shared write cursor by the block length, once all
//!    channels are done.
//!
//! ```text
//!  input ──┬──────────────────────────────(+)──► output
//!          │                               ▲
//!          ▼                               │
//!   [ ring buffer ] ── delay_samples ──► × gain
//!          ▲                               │
//!          └───────────────────────────────┘
//! ```
//!
//! Writing before reading means a delay of 0 reads back the sample that
//! was just stored, so the output is `input * (1 + gain)`.
//!
//! Delay times are whole samples. A parameter change takes effect at the
//! next block boundary as a jump in the read position.

use nih_plug::prelude::*;

use crate::error::DelayError;
use crate::params::{DelayParameters, MAX_FEEDBACK};

use super::ring_buffer::RingBuffer;

/// Seconds of history kept per channel. Sets the longest usable delay.
pub const MAX_DELAY_SECONDS: f64 = 2.0;

/// Channel count used when the host hasn't said otherwise.
pub const DEFAULT_NUM_CHANNELS: usize = 2;

/// The contract between an audio effect and whatever hosts it.
///
/// `prepare` and `release` run on a non-realtime thread while audio is
/// stopped. `process` runs on the audio thread and must not allocate,
/// block or fail.
pub trait AudioEffect {
    /// Size internal state for a new sample rate and maximum block length.
    fn prepare(&mut self, sample_rate: f64, max_block_length: usize) -> Result<(), DelayError>;

    /// Free whatever `prepare` allocated.
    fn release(&mut self);

    /// Process one block in place. `block` holds one slice per channel,
    /// all the same length.
    fn process(&mut self, block: &mut [&mut [f32]], params: &dyn DelayParameters);
}

/// Feedback delay built on a per-channel [`RingBuffer`].
#[derive(Debug, Clone)]
pub struct DelayEngine {
    ring: RingBuffer,

    /// Channel count the next `prepare` sizes the ring buffer for.
    num_channels: usize,

    sample_rate: f64,

    /// Physical slot where the next block starts. Always in
    /// `[0, capacity)`, shared by all channels.
    write_cursor: usize,
}

impl Default for DelayEngine {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_CHANNELS)
    }
}

impl DelayEngine {
    /// Create an unprepared engine. It passes audio through untouched
    /// until [`prepare()`](AudioEffect::prepare) succeeds.
    pub fn new(num_channels: usize) -> Self {
        Self {
            ring: RingBuffer::new(),
            num_channels,
            sample_rate: 0.0,
            write_cursor: 0,
        }
    }

    /// Change the channel count. Takes effect at the next `prepare`.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        self.num_channels = num_channels;
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Samples of history per channel. Zero while unprepared.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Wipe the stored history and rewind the cursor, keeping the
    /// allocation. Used when the host stops playback.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.write_cursor = 0;
    }

    /// Convert a delay time to a read offset in whole samples.
    ///
    /// ```text
    /// delay_samples = clamp(round(delay_ms * sample_rate / 1000), 0, capacity - 1)
    /// ```
    ///
    /// At 48 kHz, 500 ms is 24000 samples. Negative and NaN times read as
    /// zero; anything the buffer can't hold reads as `capacity - 1`.
    pub fn delay_samples(&self, delay_ms: f32) -> usize {
        let capacity = self.ring.capacity();
        if capacity == 0 {
            return 0;
        }

        let samples = (f64::from(delay_ms) * self.sample_rate / 1000.0).round();

        // `as` saturates, and NaN.max(0.0) is 0.0.
        (samples.max(0.0) as usize).min(capacity - 1)
    }

    /// How long the echoes stay audible after the input goes silent, in
    /// samples.
    ///
    /// Each pass around the loop scales the signal by the gain, so after
    /// `n` passes it sits at `gain^n`. Solving `gain^n = 0.001` (-60 dB):
    ///
    /// ```text
    /// n = log10(0.001) / log10(gain) = -3 / log10(gain)
    /// ```
    ///
    /// With (almost) no feedback there is still the one delayed copy.
    pub fn tail_samples(&self, params: &dyn DelayParameters) -> u32 {
        let delay = self.delay_samples(params.delay_time_ms()) as f32;
        let feedback = clamp_feedback(params.feedback_gain());

        if feedback > 0.001 {
            let repeats = -3.0 / feedback.log10();
            (repeats * delay) as u32
        } else {
            delay as u32
        }
    }
}

impl AudioEffect for DelayEngine {
    /// Allocate `round(sample_rate * MAX_DELAY_SECONDS)` samples per
    /// channel and rewind the cursor. Calling this again with the same
    /// arguments just clears the history.
    fn prepare(&mut self, sample_rate: f64, max_block_length: usize) -> Result<(), DelayError> {
        self.write_cursor = 0;

        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            self.ring.release();
            return Err(DelayError::InvalidSampleRate(sample_rate));
        }

        let capacity = (sample_rate * MAX_DELAY_SECONDS).round() as usize;
        self.ring.resize(self.num_channels, capacity)?;
        self.sample_rate = sample_rate;

        nih_log!(
            "delay buffer ready: {} channel(s) x {} samples at {} Hz",
            self.num_channels,
            capacity,
            sample_rate
        );
        if max_block_length > capacity {
            nih_warn!(
                "block length {} exceeds delay buffer capacity {}, blocks will overwrite their own history",
                max_block_length,
                capacity
            );
        }

        Ok(())
    }

    fn release(&mut self) {
        self.ring.release();
        self.write_cursor = 0;
    }

    fn process(&mut self, block: &mut [&mut [f32]], params: &dyn DelayParameters) {
        let capacity = self.ring.capacity();
        if capacity == 0 {
            return;
        }

        let num_samples = block.first().map_or(0, |channel| channel.len());
        nih_debug_assert!(
            block.iter().all(|channel| channel.len() == num_samples),
            "all channels in a block must have the same length"
        );

        // Both parameters are read once, up front. A change mid-block is
        // picked up on the next block.
        let feedback = clamp_feedback(params.feedback_gain());
        let delay = self.delay_samples(params.delay_time_ms());

        let write_start = self.write_cursor as i64;
        // Negative when the delay reaches back past slot 0; the ring buffer
        // wraps it.
        let read_start = write_start - delay as i64;

        let num_channels = self.ring.num_channels();
        for (channel, samples) in block.iter_mut().enumerate().take(num_channels) {
            for (i, &input) in samples.iter().enumerate() {
                self.ring.write_sample(channel, write_start + i as i64, input);
            }

            for (i, sample) in samples.iter_mut().enumerate() {
                let offset = i as i64;
                let wet = self.ring.read_sample(channel, read_start + offset) * feedback;
                *sample += wet;
                self.ring.add_sample(channel, write_start + offset, wet);
            }
        }

        self.write_cursor = (self.write_cursor + num_samples) % capacity;
    }
}

/// Keep the gain inside the stable range whatever the host sends.
#[inline]
fn clamp_feedback(gain: f32) -> f32 {
    if gain.is_nan() {
        return 0.0;
    }

    gain.clamp(0.0, MAX_FEEDBACK)
}

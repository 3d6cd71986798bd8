//! # Ring Buffer Store
//!
//! The ring buffer holds the most recent audio history for every channel.
//! It is a fixed-size grid of samples, one row per channel, that gets
//! reused cyclically: once the write position runs off the end of a row
//! it continues at the start, overwriting the oldest samples.
//!
//! ## Logical vs. Physical Positions
//!
//! Callers never deal with physical slots. They pass a *logical* position,
//! which may be any integer: past the end of the buffer, or negative (e.g.
//! `write_cursor - delay_samples`). The store maps it into the buffer with
//! a Euclidean remainder:
//!
//! ```text
//! physical = ((position % capacity) + capacity) % capacity
//! ```
//!
//! Example with `capacity = 100`:
//! - `position = 105` → `5`
//! - `position = -10` → `90`
//! - `position = -200` → `0`
//!
//! Because negative positions resolve on their own, the delay engine never
//! needs a separate "did we wrap?" branch when it looks backwards in time.
//!
//! ## Memory Layout
//!
//! All channels live in one `Vec<f32>`, channel-major:
//!
//! ```text
//! [ ch0[0] ch0[1] ... ch0[cap-1] | ch1[0] ch1[1] ... ch1[cap-1] | ... ]
//! ```
//!
//! The vector is only (re)allocated in [`RingBuffer::resize()`], which the
//! engine calls from `prepare()`. Reads and writes never allocate.

use crate::error::DelayError;

/// A fixed-capacity, per-channel circular sample buffer.
///
/// A freshly constructed buffer is empty (capacity 0). While empty, reads
/// return silence and writes are dropped, so a host that processes audio
/// before preparing the plugin gets untouched output instead of a crash.
#[derive(Debug, Default, Clone)]
pub struct RingBuffer {
    /// Channel-major sample storage, `num_channels * capacity` long.
    samples: Vec<f32>,

    /// Number of channel rows in `samples`.
    num_channels: usize,

    /// Samples per channel row. Zero until the first successful resize.
    capacity: usize,
}

impl RingBuffer {
    /// Create an empty ring buffer. Call [`resize()`](Self::resize) before
    /// storing anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reallocate storage for `num_channels` rows of `capacity` samples,
    /// all set to silence.
    ///
    /// Any previously stored history is discarded. If the existing
    /// allocation is already large enough it is reused, so calling this
    /// twice with the same arguments is just a clear.
    ///
    /// # Errors
    ///
    /// Returns [`DelayError::InvalidCapacity`] when `capacity` is zero. The
    /// buffer is left empty in that case.
    pub fn resize(&mut self, num_channels: usize, capacity: usize) -> Result<(), DelayError> {
        if capacity == 0 {
            self.release();
            return Err(DelayError::InvalidCapacity);
        }

        self.samples.clear();
        self.samples.resize(num_channels * capacity, 0.0);
        self.num_channels = num_channels;
        self.capacity = capacity;

        Ok(())
    }

    /// Drop the sample storage entirely. The buffer behaves as if it had
    /// never been resized.
    pub fn release(&mut self) {
        self.samples = Vec::new();
        self.num_channels = 0;
        self.capacity = 0;
    }

    /// Zero every stored sample without touching the allocation.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }

    /// Samples per channel.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// `true` until the buffer has been successfully resized.
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// Map a logical position onto a physical slot in `[0, capacity)`.
    ///
    /// Returns `0` for an empty buffer; callers check
    /// [`is_empty()`](Self::is_empty) before indexing.
    #[inline]
    pub fn wrap(&self, position: i64) -> usize {
        if self.capacity == 0 {
            return 0;
        }

        // `rem_euclid` is exactly `((p % c) + c) % c`: always non-negative.
        position.rem_euclid(self.capacity as i64) as usize
    }

    /// Store `value` for `channel` at a logical position.
    #[inline]
    pub fn write_sample(&mut self, channel: usize, position: i64, value: f32) {
        if let Some(index) = self.index(channel, position) {
            self.samples[index] = value;
        }
    }

    /// Fetch the sample for `channel` at a logical position. Silence if the
    /// buffer is empty or the channel does not exist.
    #[inline]
    pub fn read_sample(&self, channel: usize, position: i64) -> f32 {
        self.index(channel, position)
            .map_or(0.0, |index| self.samples[index])
    }

    /// Accumulate `value` onto the stored sample at a logical position.
    ///
    /// The delay engine uses this to feed the wet signal back into the
    /// history it just wrote, which is what makes echoes repeat.
    #[inline]
    pub fn add_sample(&mut self, channel: usize, position: i64, value: f32) {
        if let Some(index) = self.index(channel, position) {
            self.samples[index] += value;
        }
    }

    #[inline]
    fn index(&self, channel: usize, position: i64) -> Option<usize> {
        if self.capacity == 0 || channel >= self.num_channels {
            return None;
        }

        Some(channel * self.capacity + self.wrap(position))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

//! Errors raised by the non-realtime lifecycle calls.
//!
//! The audio path never returns an error: degenerate states there are
//! clamped or turned into no-ops. Only sizing the ring buffer can fail.

use thiserror::Error;

/// Failure to size the delay engine for a processing session.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DelayError {
    /// The ring buffer was asked to hold zero samples per channel.
    #[error("ring buffer capacity must be at least one sample")]
    InvalidCapacity,

    /// The host announced a sample rate that cannot size a buffer.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
}

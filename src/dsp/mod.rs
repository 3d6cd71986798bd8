//! # DSP (Digital Signal Processing) Primitives
//!
//! - **`ring_buffer`**: per-channel circular sample storage with
//!   wraparound-safe logical positions.
//!
//! - **`engine`**: the feedback delay itself. Writes each block into the
//!   ring buffer, reads it back after the delay time, and mixes the
//!   attenuated copy into the output.

pub mod engine;
pub mod ring_buffer;

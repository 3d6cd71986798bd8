//! # Plugin Parameters
//!
//! The delay engine needs exactly two live values from the outside world:
//! how much of the delayed signal to feed back, and how far back to read.
//! Both are owned by a control thread (the host's automation, a UI) and
//! read by the audio thread once per block.
//!
//! The engine never holds on to a parameter object. It *pulls* the values
//! through the [`DelayParameters`] trait at the start of every block. Each
//! read is a single atomic load, so there is nothing to lock and no
//! callback can fire on the audio thread.
//!
//! Two implementations are provided:
//!
//! - [`PluginParams`]: the nih-plug parameter tree the DAW sees, saves in
//!   presets, and automates.
//! - [`SharedParameters`]: two bare atomics, for hosts that don't use
//!   nih-plug and for driving the engine in tests.

use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;
use nih_plug::prelude::*;

/// Highest feedback gain the parameter allows. Kept below 1.0 so every
/// echo is quieter than the one before it.
pub const MAX_FEEDBACK: f32 = 0.99;

/// Longest delay time the parameter allows, in milliseconds.
///
/// This is deliberately larger than what the engine can store
/// (`MAX_DELAY_SECONDS`); longer settings are clamped to the buffer.
pub const MAX_DELAY_MS: f32 = 6000.0;

pub const DEFAULT_FEEDBACK: f32 = 0.5;
pub const DEFAULT_DELAY_MS: f32 = 500.0;

/// Read access to the two values the delay engine consumes every block.
///
/// Implementations must make each call a single, tear-free load. The
/// engine clamps whatever it gets, so range enforcement is up to the
/// implementation.
pub trait DelayParameters {
    /// Feedback gain, nominally in `[0.0, 0.99]`.
    fn feedback_gain(&self) -> f32;

    /// Delay time in milliseconds, nominally in `[0.0, 6000.0]`.
    fn delay_time_ms(&self) -> f32;
}

/// All user-facing parameters for the Circular Delay plugin.
///
/// The IDs are what hosts store in presets and automation lanes. Never
/// change them.
#[derive(Params)]
pub struct PluginParams {
    /// **Feedback**: how loud each echo is relative to the previous one.
    ///
    /// - 0% = the delayed copy is silent
    /// - 50% = each echo is half as loud as the last (the default)
    /// - 99% = very long, slowly decaying tails
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **Delay Time**: distance between the signal and its first echo.
    ///
    /// Range: 0 to 6000 ms in whole milliseconds. Anything beyond the
    /// two seconds the engine keeps in memory plays back at the longest
    /// delay the buffer can hold.
    #[id = "delayTime"]
    pub delay_time: FloatParam,
}

impl Default for PluginParams {
    fn default() -> Self {
        Self {
            feedback: FloatParam::new(
                "Feedback",
                DEFAULT_FEEDBACK,
                FloatRange::Linear {
                    min: 0.0,
                    max: MAX_FEEDBACK,
                },
            )
            .with_unit("%")
            .with_step_size(0.01)
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            delay_time: FloatParam::new(
                "Delay Time",
                DEFAULT_DELAY_MS,
                FloatRange::Skewed {
                    min: 0.0,
                    max: MAX_DELAY_MS,
                    // More knob travel for the short delays, where a few
                    // milliseconds are audible.
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" ms")
            // The engine works in whole samples; sub-millisecond steps
            // would mostly round away.
            .with_step_size(1.0),
        }
    }
}

impl DelayParameters for PluginParams {
    fn feedback_gain(&self) -> f32 {
        self.feedback.value()
    }

    fn delay_time_ms(&self) -> f32 {
        self.delay_time.value()
    }
}

/// Parameter values held in two independent atomics.
///
/// A control thread calls the setters; the audio thread reads through
/// [`DelayParameters`]. The values are independent scalars, so relaxed
/// ordering is enough: a reader sees either the old or the new value of
/// each, never a torn one.
#[derive(Debug)]
pub struct SharedParameters {
    feedback_gain: AtomicF32,
    delay_time_ms: AtomicF32,
}

impl SharedParameters {
    pub fn new(feedback_gain: f32, delay_time_ms: f32) -> Self {
        Self {
            feedback_gain: AtomicF32::new(feedback_gain),
            delay_time_ms: AtomicF32::new(delay_time_ms),
        }
    }

    pub fn set_feedback_gain(&self, gain: f32) {
        self.feedback_gain.store(gain, Ordering::Relaxed);
    }

    pub fn set_delay_time_ms(&self, delay_ms: f32) {
        self.delay_time_ms.store(delay_ms, Ordering::Relaxed);
    }
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK, DEFAULT_DELAY_MS)
    }
}

impl DelayParameters for SharedParameters {
    fn feedback_gain(&self) -> f32 {
        self.feedback_gain.load(Ordering::Relaxed)
    }

    fn delay_time_ms(&self) -> f32 {
        self.delay_time_ms.load(Ordering::Relaxed)
    }
}

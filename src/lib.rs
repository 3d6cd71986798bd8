//! # Circular Delay: An AU/VST3/CLAP Feedback Delay Plugin
//!
//! A circular-buffer echo built with [nih-plug](https://github.com/robbert-vdh/nih-plug).
//! Each block of audio is stored in a per-channel ring buffer, read back
//! a fixed number of samples later, scaled by the feedback gain, and added
//! to the dry signal. Because the stored history includes those echoes,
//! every repeat is fed around the loop again and decays geometrically.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬───────────────────────────────────────────(+)──► Output
//!         │                                            ▲
//!         ▼                                            │
//!       (+)──► [Ring Buffer] ── delay_samples ──► × feedback
//!         ▲                                            │
//!         └────────────────────────────────────────────┘
//! ```
//!
//! The DSP lives in [`dsp::engine::DelayEngine`] and knows nothing about
//! nih-plug: it is driven through the [`AudioEffect`] trait and pulls its
//! two parameters through [`DelayParameters`]. This file is only the glue
//! that exposes it to a host.

pub mod dsp;
pub mod error;
pub mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

pub use dsp::engine::{AudioEffect, DelayEngine, MAX_DELAY_SECONDS};
pub use dsp::ring_buffer::RingBuffer;
pub use error::DelayError;
pub use params::{DelayParameters, PluginParams, SharedParameters};

/// The plugin as the host sees it.
///
/// Parameters are shared with the host through an `Arc` and may be
/// written from any thread. The engine is owned by the audio thread and
/// only touched from the `Plugin` callbacks.
pub struct CircularDelay {
    params: Arc<PluginParams>,
    engine: DelayEngine,
}

impl Default for CircularDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            // Unprepared until initialize() tells us the sample rate.
            engine: DelayEngine::default(),
        }
    }
}

impl Plugin for CircularDelay {
    const NAME: &'static str = "Circular Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Mono or stereo, with as many outputs as inputs. Stereo first since
    // that's what most tracks are.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read once per block, so there is nothing to gain
    // from having the host split blocks at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Size the delay buffer for the host's sample rate and channel
    /// count. Called off the audio thread, so allocating here is fine.
    ///
    /// Returning `false` tells the host this configuration can't be used.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_output_channels
            .map(|c| c.get() as usize)
            .unwrap_or(dsp::engine::DEFAULT_NUM_CHANNELS);
        self.engine.set_num_channels(num_channels);

        match self.engine.prepare(
            f64::from(buffer_config.sample_rate),
            buffer_config.max_buffer_size as usize,
        ) {
            Ok(()) => true,
            Err(err) => {
                nih_error!("failed to prepare delay engine: {err}");
                false
            }
        }
    }

    /// Playback stopped or the plugin was bypassed: drop the old echoes
    /// so they don't come back when playback resumes.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn deactivate(&mut self) {
        self.engine.release();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let engine = &mut self.engine;
        let params = self.params.as_ref();

        // Long feedback tails decay into denormal range; flush them to
        // zero for the duration of the block.
        no_denormals::no_denormals(|| engine.process(buffer.as_slice(), params));

        // Keep the host calling process() while echoes are still ringing
        // after the input goes silent.
        ProcessStatus::Tail(self.engine.tail_samples(params))
    }
}

impl ClapPlugin for CircularDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.circular-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A circular-buffer delay with feedback");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for CircularDelay {
    // Must be 16 bytes and unique among all VST3 plugins.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssCircDly_v01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(CircularDelay);
nih_export_vst3!(CircularDelay);

// AUv2 entry point for Logic Pro, wrapping the CLAP export.
clap_wrapper::export_auv2!();

//! fxchain Effects - pipeline stages and the effect chain
//!
//! Four stages built on [`fxchain_core`] primitives, an orchestrator that
//! runs them in a fixed order, and a thin host-facing facade.
//!
//! # Stages
//!
//! | Stage | Parameters | Notes |
//! |-------|------------|-------|
//! | [`FilterStage`] | cutoff (100–20000 Hz), mode (LP/HP) | First-order bilinear IIR |
//! | [`DelayStage`] | delay (0–2000 ms), feedback (0–1) | Feedback ring buffer |
//! | [`ReverbStage`] | room size, damping, wet, dry, width, freeze | Freeverb tank per channel |
//! | [`GainStage`] | gain (−60–+24 dB), ramp (s) | Linear ramp shared by all channels |
//!
//! # Threading
//!
//! Every stage hands out a cloneable control handle ([`DelayControl`],
//! [`FilterControl`], …) that is `Send + Sync`. Setters on a handle write
//! atomics and raise a dirty flag; the audio thread applies them at the next
//! block boundary in [`EffectChain::apply_pending_parameter_changes`].
//! [`ChainControl`] bundles the handles of a chain.
//!
//! # Example
//!
//! ```rust
//! use fxchain_effects::{ChainSettings, EffectChain};
//! use fxchain_core::StreamConfig;
//!
//! let mut chain = EffectChain::standard(&ChainSettings::default());
//! let control = chain.control().clone();
//!
//! chain.configure_stream(StreamConfig::new(48000.0, 2, 256).unwrap());
//!
//! // From any thread:
//! control.set_room_size(0.8);
//! control.set_delay_ms(250.0);
//!
//! // Audio thread, once per block:
//! let mut left = [0.0f32; 256];
//! let mut right = [0.0f32; 256];
//! chain.apply_pending_parameter_changes();
//! chain.process_block(&mut [&mut left, &mut right], false).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod chain;
pub mod delay;
pub mod error;
pub mod filter;
pub mod gain;
pub mod processor;
pub mod reverb;
pub mod settings;

pub use chain::{ChainControl, ChainState, EffectChain, EffectChainBuilder};
pub use delay::{DelayControl, DelayStage};
pub use error::{ChainError, Result};
pub use filter::{FilterControl, FilterStage};
pub use gain::{GainControl, GainStage};
pub use processor::{FxProcessor, Pipeline};
pub use reverb::{Reverb, ReverbControl, ReverbParameters, ReverbStage};
pub use settings::ChainSettings;

//! fxchain Core - real-time primitives for the fxchain effect pipeline
//!
//! This crate provides the building blocks the effect stages are assembled
//! from. Everything here is designed for a hard real-time audio callback:
//! storage is sized up front in `configure`, and the per-sample paths never
//! allocate, lock, or block.
//!
//! # Core Abstractions
//!
//! ## Stages
//!
//! - [`Stage`] - Object-safe capability trait every pipeline stage implements
//! - [`StreamConfig`] - Validated stream description (rate, channels, block size)
//!
//! ## Parameters
//!
//! - [`LinearSmoothedParam`] - Linear ramp with exact arrival at the target
//! - [`SharedParam`] / [`SharedFlag`] - Lock-free control-to-audio handoff with a dirty flag
//! - [`AtomicF32`] - `f32` stored as bits in an `AtomicU32`
//!
//! ## Delay Lines and Filters
//!
//! - [`DelayLine`] - Multichannel feedback ring buffer with resizable length
//! - [`FirstOrderCoefficients`] / [`FirstOrderState`] - Bilinear one-pole LP/HP
//! - [`CombFilter`] - Damped feedback comb for Freeverb-style reverbs
//! - [`AllpassFilter`] - Schroeder allpass for diffusion
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`ms_to_samples`], [`flush_denormal`]
//! - Test signals: [`signal::impulse`], [`signal::ramp`]
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible (it needs `alloc`). Disable the default
//! `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! fxchain-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use fxchain_core::DelayLine;
//!
//! let mut delay = DelayLine::new();
//! delay.configure(48000.0, 1).unwrap();
//! delay.set_delay_samples(2);
//! delay.set_feedback(0.5);
//!
//! let mut mono = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! delay.process_in_place(&mut [&mut mono[..]], false);
//! assert_eq!(mono, [1.0, 2.0, 3.5, 5.0, 6.75, 8.5]);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **Block-size independent**: State carries across block boundaries exactly
//! - **Parameters land at block boundaries**: setters only write atomics

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod allpass;
pub mod comb;
pub mod delay;
pub mod error;
pub mod first_order;
pub mod math;
pub mod param;
pub mod shared;
pub mod signal;
pub mod stage;
pub mod stream;

// Re-export main types at crate root
pub use allpass::AllpassFilter;
pub use comb::CombFilter;
pub use delay::{DEFAULT_MAX_DELAY_MS, DelayLine};
pub use error::{ConfigError, Result};
pub use first_order::{FilterMode, FirstOrderCoefficients, FirstOrderState};
pub use math::{db_to_linear, flush_denormal, linear_to_db, ms_to_samples, samples_to_ms};
pub use param::LinearSmoothedParam;
pub use shared::{AtomicF32, SharedFlag, SharedParam};
pub use stage::{Stage, TAIL_INFINITE};
pub use stream::{StreamConfig, validate_layout};

//! The capability every pipeline stage implements.
//!
//! An effect chain stores its stages as `Box<dyn Stage>` and drives them
//! through a fixed lifecycle:
//!
//! 1. [`configure`](Stage::configure) once per stream (allocates)
//! 2. per block: [`apply_pending_changes`](Stage::apply_pending_changes),
//!    then [`process`](Stage::process)
//!
//! ## Design Decisions
//!
//! - **In-place blocks**: a block is a slice of per-channel sample slices.
//!   Each stage rewrites it in place; nothing is copied between stages.
//!
//! - **Deferred parameters**: control-thread setters only touch atomics.
//!   A stage picks up new values in `apply_pending_changes`, so a change
//!   always lands on a block boundary, never mid-block.
//!
//! - **Bypass freezes state**: a bypassed stage leaves audio untouched and
//!   advances no ramp, cursor, or filter register.

use crate::StreamConfig;

/// Tail length reported by a stage whose output never decays (feedback at
/// unity, frozen reverb).
pub const TAIL_INFINITE: usize = usize::MAX;

/// A pipeline stage.
///
/// # Example
///
/// ```rust
/// use fxchain_core::{Stage, StreamConfig};
///
/// struct Invert;
///
/// impl Stage for Invert {
///     fn name(&self) -> &'static str {
///         "invert"
///     }
///
///     fn configure(&mut self, _config: &StreamConfig) {}
///
///     fn apply_pending_changes(&mut self) {}
///
///     fn process(&mut self, block: &mut [&mut [f32]], bypassed: bool) {
///         if bypassed {
///             return;
///         }
///         for channel in block.iter_mut() {
///             for sample in channel.iter_mut() {
///                 *sample = -*sample;
///             }
///         }
///     }
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Stage: Send {
    /// Short identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Prepare for a stream: size buffers, recompute rate-dependent
    /// coefficients, and adopt every parameter value immediately.
    ///
    /// Allocates. Must only be called while the audio thread is quiescent.
    fn configure(&mut self, config: &StreamConfig);

    /// Apply parameter changes made since the previous block.
    ///
    /// Called on the audio thread once per block, before [`process`](Self::process).
    fn apply_pending_changes(&mut self);

    /// Process one block in place.
    ///
    /// # Panics
    ///
    /// Implementations may panic if the block's channel count differs from
    /// the configured one or its channels differ in length.
    fn process(&mut self, block: &mut [&mut [f32]], bypassed: bool);

    /// Clear internal audio state (delay contents, filter registers) without
    /// touching parameters.
    fn reset(&mut self);

    /// Samples of output produced after the input falls silent.
    ///
    /// [`TAIL_INFINITE`] for a stage that never decays.
    fn tail_samples(&self) -> usize {
        0
    }
}

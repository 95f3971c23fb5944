//! Lock-free parameter cells shared between a control thread and the audio thread.
//!
//! Each cell pairs a value with a dirty flag. The control thread is the only
//! writer: it stores the value, then raises the flag. The audio thread is the
//! only reader: once per block it clears the flag and, if it was raised, reads
//! the value and applies it. Nothing here blocks or allocates.
//!
//! ```text
//! control thread                  audio thread (block boundary)
//! ──────────────                  ─────────────────────────────
//! value.store(v, Release)
//! dirty.store(true, Release)  ─►  if dirty.swap(false, AcqRel) {
//!                                     apply(value.load(Acquire))
//!                                 }
//! ```
//!
//! If a second `set` lands between the swap and the load, the audio thread
//! sees the newer value now and again on the next block. Applying a value
//! twice is harmless, so no update is ever lost.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// An `f32` stored as raw bits in an [`AtomicU32`].
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    /// Create a new atomic holding `value`.
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    /// Load the value.
    #[inline]
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.0.load(order))
    }

    /// Store a value.
    #[inline]
    pub fn store(&self, value: f32, order: Ordering) {
        self.0.store(value.to_bits(), order);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A clamped scalar parameter with a dirty flag.
///
/// # Example
///
/// ```rust
/// use fxchain_core::SharedParam;
///
/// let feedback = SharedParam::new(0.5, 0.0, 1.0);
/// assert_eq!(feedback.take(), None);
///
/// feedback.set(1.7); // clamped
/// assert_eq!(feedback.get(), 1.0);
/// assert_eq!(feedback.take(), Some(1.0));
/// assert_eq!(feedback.take(), None);
/// ```
#[derive(Debug)]
pub struct SharedParam {
    value: AtomicF32,
    dirty: AtomicBool,
    min: f32,
    max: f32,
}

impl SharedParam {
    /// Create a clean parameter holding `initial` clamped to `[min, max]`.
    pub fn new(initial: f32, min: f32, max: f32) -> Self {
        debug_assert!(min <= max, "invalid range [{min}, {max}]");
        Self {
            value: AtomicF32::new(clamp_finite(initial, min, max)),
            dirty: AtomicBool::new(false),
            min,
            max,
        }
    }

    /// Store a new value (clamped to the range) and mark it dirty.
    ///
    /// NaN is treated as the lower bound.
    pub fn set(&self, value: f32) {
        self.value
            .store(clamp_finite(value, self.min, self.max), Ordering::Release);
        self.dirty.store(true, Ordering::Release);
    }

    /// Most recently set value, whether or not it has been applied yet.
    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    /// Clear the dirty flag and return the value if it was set since the last take.
    #[inline]
    pub fn take(&self) -> Option<f32> {
        if self.dirty.swap(false, Ordering::AcqRel) {
            Some(self.value.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Clear the dirty flag and return the value unconditionally.
    ///
    /// Used when a stage is (re)configured and adopts every parameter at once.
    #[inline]
    pub fn take_current(&self) -> f32 {
        self.dirty.store(false, Ordering::Release);
        self.value.load(Ordering::Acquire)
    }

    /// True if a value is waiting to be applied.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Lower and upper bound.
    #[inline]
    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

/// A boolean switch with a dirty flag (filter mode, freeze).
#[derive(Debug, Default)]
pub struct SharedFlag {
    value: AtomicBool,
    dirty: AtomicBool,
}

impl SharedFlag {
    /// Create a clean flag.
    pub fn new(initial: bool) -> Self {
        Self {
            value: AtomicBool::new(initial),
            dirty: AtomicBool::new(false),
        }
    }

    /// Store a value and mark it dirty.
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
        self.dirty.store(true, Ordering::Release);
    }

    /// Most recently set value.
    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    /// Clear the dirty flag and return the value if it was set since the last take.
    #[inline]
    pub fn take(&self) -> Option<bool> {
        if self.dirty.swap(false, Ordering::AcqRel) {
            Some(self.value.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Clear the dirty flag and return the value unconditionally.
    #[inline]
    pub fn take_current(&self) -> bool {
        self.dirty.store(false, Ordering::Release);
        self.value.load(Ordering::Acquire)
    }
}

#[inline]
fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

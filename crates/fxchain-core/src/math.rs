//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Time Conversions
//!
//! - [`ms_to_samples`] / [`samples_to_ms`] - Rounded sample counts, guarded
//!   against an unset (zero) sample rate

use libm::{exp, log10, round};

/// Convert decibels to linear gain: `10^(db / 20)`.
///
/// # Example
/// ```rust
/// use fxchain_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20), evaluated in f64 so +x and -x dB
    // round to reciprocal gains
    const FACTOR: f64 = core::f64::consts::LN_10 / 20.0;
    exp(f64::from(db) * FACTOR) as f32
}

/// Convert linear gain to decibels.
///
/// Inputs at or below `1e-10` are floored there (-200 dB) instead of
/// returning `-inf`.
///
/// # Example
/// ```rust
/// use fxchain_core::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 1e-4);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    (20.0 * log10(f64::from(linear).max(1e-10))) as f32
}

/// Convert milliseconds to a whole number of samples.
///
/// `samples = round(ms * sample_rate / 1000)`. Negative or non-finite inputs
/// map to zero.
#[inline]
pub fn ms_to_samples(ms: f64, sample_rate: f64) -> usize {
    let samples = round(ms * sample_rate / 1000.0);
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

/// Convert a sample count to milliseconds.
///
/// Returns 0 when the sample rate is unset (zero or negative).
#[inline]
pub fn samples_to_ms(samples: usize, sample_rate: f64) -> f64 {
    if sample_rate > 0.0 {
        samples as f64 * 1000.0 / sample_rate
    } else {
        0.0
    }
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Values below 1e-20 are replaced with zero, well before the IEEE 754
/// subnormal range. Used in recursive paths (comb filters, allpasses,
/// filter state) where a signal can decay toward zero forever.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversions() {
        assert!((db_to_linear(6.0) - 1.995_262).abs() < 1e-5);
        assert!((db_to_linear(-60.0) - 0.001).abs() < 1e-7);
        assert!((linear_to_db(db_to_linear(-12.5)) + 12.5).abs() < 1e-4);

        // +x dB and -x dB cancel
        let unity = db_to_linear(6.0) * db_to_linear(-6.0);
        assert!((unity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_to_db_floor() {
        assert!(linear_to_db(0.0).is_finite());
        assert!((linear_to_db(0.0) + 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_time_conversions() {
        assert_eq!(ms_to_samples(500.0, 48000.0), 24000);
        assert_eq!(ms_to_samples(0.01, 48000.0), 0);
        assert_eq!(ms_to_samples(0.011, 48000.0), 1);
        assert_eq!(ms_to_samples(-5.0, 48000.0), 0);
        assert_eq!(ms_to_samples(f64::NAN, 48000.0), 0);

        assert_eq!(samples_to_ms(24000, 48000.0), 500.0);
        assert_eq!(samples_to_ms(24000, 0.0), 0.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}

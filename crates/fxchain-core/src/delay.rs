//! Multichannel feedback delay line.
//!
//! [`DelayLine`] is a ring buffer per channel with a read and a write cursor
//! that advance in lock-step. Each sample:
//!
//! ```text
//! y[n]         = x[n] + feedback · ring[read]
//! ring[write]  = y[n]
//! read, write  = read + 1, write + 1   (mod len)
//! ```
//!
//! With a delay of `d` samples the ring holds `d + 1` slots and the write
//! cursor sits `d` slots ahead of the read cursor, so `ring[read]` is the
//! output from exactly `d` samples ago: `y[n] = x[n] + fb · y[n - d]`.
//! A delay of zero leaves a single slot, which holds the previous output,
//! giving a one-sample recursion.
//!
//! # Memory
//!
//! [`configure`](DelayLine::configure) allocates every channel to hold the
//! maximum delay (2 s by default). Changing the delay zero-fills and
//! re-seats the cursors without allocating; lengths beyond the maximum are
//! clamped to it.
//!
//! # Sample-rate changes
//!
//! The delay is stored in samples. Re-configuring at a new rate rescales it,
//! `new = round(old · new_rate / old_rate)`, so the delay time in
//! milliseconds survives. The buffer contents are cleared.
//!
//! # Feedback ramp
//!
//! The feedback coefficient is a single [`LinearSmoothedParam`] advanced once
//! per sample index, so every channel sees the same feedback at a given
//! sample. While bypassed neither the ramp nor the cursors move.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::Result;
use crate::param::LinearSmoothedParam;
use crate::stage::TAIL_INFINITE;
use crate::stream::{StreamConfig, validate_layout};
use crate::{flush_denormal, ms_to_samples, samples_to_ms};

/// Largest delay, in milliseconds, storage is pre-allocated for.
pub const DEFAULT_MAX_DELAY_MS: f64 = 2000.0;

/// Feedback coefficient of a freshly created line.
pub const DEFAULT_FEEDBACK: f32 = 0.5;

/// Feedback ramp length used once a sample rate is known.
pub const DEFAULT_FEEDBACK_RAMP_MS: f64 = 10.0;

/// Multichannel feedback delay line with shared cursors and feedback ramp.
///
/// # Example
///
/// ```rust
/// use fxchain_core::DelayLine;
///
/// let mut delay = DelayLine::new();
/// delay.configure(48000.0, 2).unwrap();
/// delay.set_delay_ms(500.0);
/// assert_eq!(delay.delay_samples(), 24000);
///
/// delay.configure(96000.0, 2).unwrap();
/// assert_eq!(delay.delay_samples(), 48000);
/// assert_eq!(delay.delay_ms(), 500.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// One ring per channel; only the first `len` slots are in use.
    rings: Vec<Vec<f32>>,
    /// Logical ring length, `delay_samples + 1`.
    len: usize,
    read: usize,
    write: usize,
    delay_samples: usize,
    /// Delay requested in ms before any sample rate was known.
    pending_ms: Option<f64>,
    sample_rate: f64,
    max_delay_ms: f64,
    feedback: LinearSmoothedParam,
    feedback_ramp_ms: f64,
}

impl DelayLine {
    /// Create an unconfigured line: zero delay, zero channels, feedback 0.5.
    pub fn new() -> Self {
        Self {
            rings: Vec::new(),
            len: 1,
            read: 0,
            write: 0,
            delay_samples: 0,
            pending_ms: None,
            sample_rate: 0.0,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            feedback: LinearSmoothedParam::new(DEFAULT_FEEDBACK).with_range(0.0, 1.0),
            feedback_ramp_ms: DEFAULT_FEEDBACK_RAMP_MS,
        }
    }

    /// Set the largest delay storage is sized for. Takes effect at the next
    /// [`configure`](Self::configure).
    pub fn set_max_delay_ms(&mut self, ms: f64) {
        self.max_delay_ms = ms.max(0.0);
    }

    /// Largest delay, in milliseconds, accepted by [`set_delay_ms`](Self::set_delay_ms).
    #[inline]
    pub fn max_delay_ms(&self) -> f64 {
        self.max_delay_ms
    }

    /// (Re)allocate per-channel storage for a stream.
    ///
    /// An existing delay is rescaled to the new rate when the previous rate
    /// was known and differs; a delay requested in milliseconds before the
    /// first configuration is converted now. Buffer contents are cleared, the
    /// cursors re-seated, and any feedback ramp in progress completes.
    ///
    /// Allocates. Not real-time safe.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidSampleRate`](crate::ConfigError::InvalidSampleRate)
    /// or [`ConfigError::NoChannels`](crate::ConfigError::NoChannels); the
    /// line is left untouched.
    pub fn configure(&mut self, sample_rate: f64, num_channels: usize) -> Result<()> {
        validate_layout(sample_rate, num_channels)?;
        self.prepare(sample_rate, num_channels);
        Ok(())
    }

    /// [`configure`](Self::configure) for an already validated stream.
    pub fn configure_stream(&mut self, config: &StreamConfig) {
        self.prepare(config.sample_rate(), config.num_channels());
    }

    fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        if let Some(ms) = self.pending_ms.take() {
            self.delay_samples = ms_to_samples(ms, sample_rate);
        } else if self.delay_samples > 0
            && self.sample_rate > 0.0
            && sample_rate != self.sample_rate
        {
            let old = self.delay_samples;
            self.delay_samples = resample_delay(old, self.sample_rate, sample_rate);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                old_samples = old,
                new_samples = self.delay_samples,
                old_rate = self.sample_rate,
                new_rate = sample_rate,
                "delay rescaled for new sample rate"
            );
        }

        self.sample_rate = sample_rate;

        let max_samples = ms_to_samples(self.max_delay_ms, sample_rate);
        self.delay_samples = self.delay_samples.min(max_samples);
        let capacity = max_samples.saturating_add(1);
        self.rings = (0..num_channels).map(|_| vec![0.0; capacity]).collect();

        self.feedback
            .set_ramp_duration_seconds(sample_rate, self.feedback_ramp_ms / 1000.0);
        self.seat_cursors();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            num_channels,
            capacity,
            delay_samples = self.delay_samples,
            "delay line configured"
        );
    }

    /// Set the delay in samples, clamped to the maximum delay once a sample
    /// rate is known.
    ///
    /// Zero-fills the rings and re-seats the cursors so that
    /// `write == read + samples (mod samples + 1)`. Never allocates.
    pub fn set_delay_samples(&mut self, samples: usize) {
        self.pending_ms = None;
        self.delay_samples = samples.min(self.max_delay_samples());
        self.seat_cursors();
    }

    /// Longest delay, in samples, the line accepts right now.
    ///
    /// Unbounded (bar one slot) until the first configuration, which clamps
    /// whatever was requested.
    pub fn max_delay_samples(&self) -> usize {
        if self.sample_rate <= 0.0 {
            return usize::MAX - 1;
        }
        let limit = ms_to_samples(self.max_delay_ms, self.sample_rate);
        match self.rings.first() {
            Some(ring) => limit.min(ring.len().saturating_sub(1)),
            None => limit,
        }
    }

    /// Set the delay in milliseconds, clamped to `[0, max_delay_ms]`.
    ///
    /// Converted with `round(ms · sample_rate / 1000)`. Before the first
    /// [`configure`](Self::configure) the value is held and converted then.
    pub fn set_delay_ms(&mut self, ms: f64) {
        let ms = if ms.is_nan() {
            0.0
        } else {
            ms.clamp(0.0, self.max_delay_ms)
        };

        if self.sample_rate > 0.0 {
            self.set_delay_samples(ms_to_samples(ms, self.sample_rate));
        } else {
            self.set_delay_samples(0);
            self.pending_ms = Some(ms);
        }
    }

    /// Current delay in samples.
    #[inline]
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Current delay in milliseconds; 0 while the sample rate is unset.
    #[inline]
    pub fn delay_ms(&self) -> f64 {
        samples_to_ms(self.delay_samples, self.sample_rate)
    }

    /// Set the feedback target, clamped to `[0, 1]`, reached over the
    /// feedback ramp (instantly while no sample rate is known).
    pub fn set_feedback(&mut self, feedback: f32) {
        let feedback = if feedback.is_nan() { 0.0 } else { feedback };
        self.feedback.glide_to(feedback);
    }

    /// Feedback target.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback.current_target()
    }

    /// Set the feedback ramp length. Takes effect at the next
    /// [`configure`](Self::configure).
    pub fn set_feedback_ramp_ms(&mut self, ms: f64) {
        self.feedback_ramp_ms = ms.max(0.0);
    }

    /// Sample rate of the last configuration, 0 if never configured.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of channels storage is allocated for.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.rings.len()
    }

    /// Samples of storage per channel.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.rings.first().map_or(0, Vec::len)
    }

    /// Process `input` into `output`.
    ///
    /// # Panics
    ///
    /// If the channel counts differ from each other or from the configured
    /// count, or if any channel length differs from the others.
    pub fn process(&mut self, input: &[&[f32]], output: &mut [&mut [f32]], bypassed: bool) {
        assert_eq!(
            input.len(),
            output.len(),
            "input and output channel counts differ"
        );
        for (src, dst) in input.iter().zip(output.iter_mut()) {
            assert_eq!(src.len(), dst.len(), "input and output lengths differ");
            dst.copy_from_slice(src);
        }
        self.process_in_place(output, bypassed);
    }

    /// Process a block in place.
    ///
    /// Bypassed blocks pass through untouched and freeze the cursors and
    /// the feedback ramp, so processing resumes exactly where it stopped.
    ///
    /// # Panics
    ///
    /// If the channel count differs from the configured count or the
    /// channels have different lengths.
    pub fn process_in_place(&mut self, block: &mut [&mut [f32]], bypassed: bool) {
        assert_eq!(
            block.len(),
            self.rings.len(),
            "block has {} channels, delay line configured for {}",
            block.len(),
            self.rings.len()
        );
        let frames = block.first().map_or(0, |ch| ch.len());
        assert!(
            block.iter().all(|ch| ch.len() == frames),
            "channels have different lengths"
        );

        if bypassed {
            return;
        }

        for i in 0..frames {
            let feedback = self.feedback.next_value();
            for (ring, channel) in self.rings.iter_mut().zip(block.iter_mut()) {
                let out = channel[i] + feedback * ring[self.read];
                ring[self.write] = flush_denormal(out);
                channel[i] = out;
            }
            self.read = if self.read + 1 == self.len { 0 } else { self.read + 1 };
            self.write = if self.write + 1 == self.len { 0 } else { self.write + 1 };
        }
    }

    /// Clear the stored signal and re-seat the cursors. Parameters are kept.
    pub fn reset(&mut self) {
        self.feedback.snap_to_target();
        self.seat_cursors();
    }

    /// Samples until the feedback loop has decayed by 60 dB.
    ///
    /// [`TAIL_INFINITE`] when feedback is 1.
    pub fn tail_samples(&self) -> usize {
        let feedback = self.feedback.current_target();
        let d = self.delay_samples.max(1);
        if feedback >= 1.0 {
            return TAIL_INFINITE;
        }
        if feedback <= 0.0 {
            return d;
        }
        // fb^k = 0.001
        let repeats = libm::ceil(libm::log(0.001) / libm::log(f64::from(feedback)));
        (repeats as usize).saturating_add(1).saturating_mul(d)
    }

    fn seat_cursors(&mut self) {
        self.len = self.delay_samples + 1;
        for ring in &mut self.rings {
            ring[..self.len].fill(0.0);
        }
        self.read = 0;
        self.write = self.delay_samples;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Rescale a delay length between sample rates, rounding to the nearest sample.
#[inline]
pub fn resample_delay(samples: usize, old_rate: f64, new_rate: f64) -> usize {
    let scaled = libm::round(samples as f64 * new_rate / old_rate);
    if scaled.is_finite() && scaled > 0.0 {
        scaled as usize
    } else {
        0
    }
}

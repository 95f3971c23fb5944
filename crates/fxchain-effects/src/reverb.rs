//! Algorithmic reverb.
//!
//! A Freeverb-style reverberator: per channel, eight parallel damped comb
//! filters feeding four series allpasses. Channels are processed in pairs
//! (0, 1), (2, 3), …; both tanks of a pair receive the summed pair input,
//! the second tank's delays are spread by 23 samples for decorrelation, and
//! the two tank outputs are cross-mixed according to `width`. A trailing
//! unpaired channel runs through a mono tank. Nothing crosses between pairs.
//!
//! # Parameters
//!
//! | Parameter | Range | Default | Effect |
//! |-----------|-------|---------|--------|
//! | `room_size` | 0–1 | 0.5 | Comb feedback, `room · 0.28 + 0.7` |
//! | `damping` | 0–1 | 0.5 | High-frequency absorption in the combs |
//! | `wet_level` | 0–1 | 0.33 | Reverberated signal level |
//! | `dry_level` | 0–1 | 0.4 | Direct signal level |
//! | `width` | 0–1 | 1.0 | Stereo spread of the wet signal |
//! | `freeze` | bool | false | Infinite sustain, input muted |
//!
//! Comb feedback, damping, and the wet/dry gains ramp over 10 ms. The ramps
//! advance once per sample index, shared by every channel.

use alloc::sync::Arc;
use alloc::vec::Vec;

use fxchain_core::{
    AllpassFilter, CombFilter, LinearSmoothedParam, SharedFlag, SharedParam, Stage, StreamConfig,
    TAIL_INFINITE, validate_layout,
};

/// Freeverb comb filter delay times (at 44.1kHz reference).
/// These are mutually prime to avoid resonances.
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Freeverb allpass filter delay times (at 44.1kHz reference).
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];

/// Extra delay, in reference samples, for the second tank of a stereo pair.
const STEREO_SPREAD: usize = 23;

/// Reference sample rate for tuning constants.
const REFERENCE_RATE: f64 = 44100.0;

const INPUT_GAIN: f32 = 0.015;
const WET_SCALE: f32 = 3.0;
const DRY_SCALE: f32 = 2.0;
const ROOM_SCALE: f32 = 0.28;
const ROOM_OFFSET: f32 = 0.7;
const DAMP_SCALE: f32 = 0.4;
const RAMP_SECONDS: f64 = 0.01;

/// Scale delay times from reference rate to target rate.
fn scale_to_rate(samples: usize, sample_rate: f64) -> usize {
    (libm::round(samples as f64 * sample_rate / REFERENCE_RATE) as usize).max(1)
}

/// Reverberator settings, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    /// Room size: longer decay as it grows.
    pub room_size: f32,
    /// High-frequency damping (0 = bright, 1 = dark).
    pub damping: f32,
    /// Level of the reverberated signal.
    pub wet_level: f32,
    /// Level of the direct signal.
    pub dry_level: f32,
    /// Stereo width of the wet signal (0 = mono).
    pub width: f32,
    /// Hold the current tail forever and mute the input.
    pub freeze: bool,
}

impl ReverbParameters {
    /// Clamp every field into `[0, 1]`.
    pub fn clamped(self) -> Self {
        let unit = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            room_size: unit(self.room_size),
            damping: unit(self.damping),
            wet_level: unit(self.wet_level),
            dry_level: unit(self.dry_level),
            width: unit(self.width),
            freeze: self.freeze,
        }
    }
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.33,
            dry_level: 0.4,
            width: 1.0,
            freeze: false,
        }
    }
}

/// Eight combs and four allpasses for one channel.
#[derive(Debug, Clone)]
struct Tank {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
}

impl Tank {
    fn new(sample_rate: f64, spread: usize) -> Self {
        Self {
            combs: core::array::from_fn(|i| {
                CombFilter::new(scale_to_rate(COMB_TUNINGS_44K[i] + spread, sample_rate))
            }),
            allpasses: core::array::from_fn(|i| {
                AllpassFilter::new(scale_to_rate(ALLPASS_TUNINGS_44K[i] + spread, sample_rate))
            }),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let mut out = 0.0;
        for comb in &mut self.combs {
            out += comb.process(input, feedback, damp);
        }
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }
        out
    }

    fn clear(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::clear);
        self.allpasses.iter_mut().for_each(AllpassFilter::clear);
    }

    fn longest_comb(&self) -> usize {
        self.combs.iter().map(CombFilter::len).max().unwrap_or(0)
    }
}

/// Freeverb-style multichannel reverberator.
///
/// # Example
///
/// ```rust
/// use fxchain_effects::{Reverb, ReverbParameters};
///
/// let mut reverb = Reverb::new();
/// reverb.configure(48000.0, 2).unwrap();
/// reverb.set_parameters(ReverbParameters { room_size: 0.8, ..Default::default() });
///
/// let mut left = [0.0f32; 64];
/// let mut right = [0.0f32; 64];
/// left[0] = 1.0;
/// reverb.process(&mut [&mut left, &mut right]);
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    tanks: Vec<Tank>,
    parameters: ReverbParameters,
    input_gain: f32,
    feedback: LinearSmoothedParam,
    damping: LinearSmoothedParam,
    dry_gain: LinearSmoothedParam,
    wet_gain1: LinearSmoothedParam,
    wet_gain2: LinearSmoothedParam,
}

impl Reverb {
    /// Create an unconfigured reverberator with default parameters.
    pub fn new() -> Self {
        let mut reverb = Self {
            tanks: Vec::new(),
            parameters: ReverbParameters::default(),
            input_gain: INPUT_GAIN,
            feedback: LinearSmoothedParam::new(0.0),
            damping: LinearSmoothedParam::new(0.0),
            dry_gain: LinearSmoothedParam::new(0.0),
            wet_gain1: LinearSmoothedParam::new(0.0),
            wet_gain2: LinearSmoothedParam::new(0.0),
        };
        reverb.set_parameters(ReverbParameters::default());
        reverb.snap();
        reverb
    }

    /// Build one tank per channel for `sample_rate`. Allocates.
    ///
    /// # Errors
    ///
    /// [`ConfigError`](fxchain_core::ConfigError) for a non-positive or
    /// non-finite rate or zero channels; the reverberator is left untouched.
    pub fn configure(
        &mut self,
        sample_rate: f64,
        num_channels: usize,
    ) -> fxchain_core::Result<()> {
        validate_layout(sample_rate, num_channels)?;
        self.prepare(sample_rate, num_channels);
        Ok(())
    }

    /// [`configure`](Self::configure) for an already validated stream.
    pub fn configure_stream(&mut self, config: &StreamConfig) {
        self.prepare(config.sample_rate(), config.num_channels());
    }

    fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.tanks = (0..num_channels)
            .map(|ch| {
                // odd channels are always the right half of a pair
                let spread = if ch % 2 == 1 { STEREO_SPREAD } else { 0 };
                Tank::new(sample_rate, spread)
            })
            .collect();

        for ramp in self.ramps_mut() {
            ramp.set_ramp_duration_seconds(sample_rate, RAMP_SECONDS);
        }
    }

    /// Current parameters.
    pub fn parameters(&self) -> ReverbParameters {
        self.parameters
    }

    /// Update parameters; gains and coefficients ramp to the new values.
    pub fn set_parameters(&mut self, parameters: ReverbParameters) {
        let p = parameters.clamped();
        self.parameters = p;

        let wet = p.wet_level * WET_SCALE;
        self.dry_gain.glide_to(p.dry_level * DRY_SCALE);
        self.wet_gain1.glide_to(0.5 * wet * (1.0 + p.width));
        self.wet_gain2.glide_to(0.5 * wet * (1.0 - p.width));

        if p.freeze {
            self.input_gain = 0.0;
            self.damping.glide_to(0.0);
            self.feedback.glide_to(1.0);
        } else {
            self.input_gain = INPUT_GAIN;
            self.damping.glide_to(p.damping * DAMP_SCALE);
            self.feedback.glide_to(p.room_size * ROOM_SCALE + ROOM_OFFSET);
        }
    }

    /// Finish every ramp immediately.
    pub fn snap(&mut self) {
        for ramp in self.ramps_mut() {
            ramp.snap_to_target();
        }
    }

    /// Number of channels configured.
    pub fn num_channels(&self) -> usize {
        self.tanks.len()
    }

    /// Process a block in place.
    ///
    /// # Panics
    ///
    /// If the channel count differs from the configured count or the
    /// channels have different lengths.
    pub fn process(&mut self, block: &mut [&mut [f32]]) {
        assert_eq!(
            block.len(),
            self.tanks.len(),
            "block has {} channels, reverb configured for {}",
            block.len(),
            self.tanks.len()
        );
        let frames = block.first().map_or(0, |ch| ch.len());
        assert!(
            block.iter().all(|ch| ch.len() == frames),
            "channels have different lengths"
        );

        let channels = block.len();
        let gain = self.input_gain;

        for i in 0..frames {
            let feedback = self.feedback.next_value();
            let damp = self.damping.next_value();
            let dry = self.dry_gain.next_value();
            let wet1 = self.wet_gain1.next_value();
            let wet2 = self.wet_gain2.next_value();

            let mut ch = 0;
            while ch + 1 < channels {
                let left = block[ch][i];
                let right = block[ch + 1][i];
                let input = (left + right) * gain;

                let out_l = self.tanks[ch].process(input, feedback, damp);
                let out_r = self.tanks[ch + 1].process(input, feedback, damp);

                block[ch][i] = out_l * wet1 + out_r * wet2 + left * dry;
                block[ch + 1][i] = out_r * wet1 + out_l * wet2 + right * dry;
                ch += 2;
            }

            if ch < channels {
                let x = block[ch][i];
                let out = self.tanks[ch].process(x * gain, feedback, damp);
                block[ch][i] = out * wet1 + x * dry;
            }
        }
    }

    /// Clear every tank.
    pub fn reset(&mut self) {
        self.tanks.iter_mut().for_each(Tank::clear);
        self.snap();
    }

    /// Samples until the comb feedback has decayed by 60 dB.
    pub fn tail_samples(&self) -> usize {
        if self.parameters.freeze {
            return TAIL_INFINITE;
        }
        let feedback = f64::from(self.feedback.current_target());
        let longest = self.tanks.iter().map(Tank::longest_comb).max().unwrap_or(0);
        if longest == 0 || feedback <= 0.0 {
            return longest;
        }
        let passes = libm::ceil(libm::log(0.001) / libm::log(feedback));
        (passes as usize).saturating_mul(longest)
    }

    fn ramps_mut(&mut self) -> [&mut LinearSmoothedParam; 5] {
        [
            &mut self.feedback,
            &mut self.damping,
            &mut self.dry_gain,
            &mut self.wet_gain1,
            &mut self.wet_gain2,
        ]
    }
}

impl Default for Reverb {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct ReverbParams {
    room_size: SharedParam,
    damping: SharedParam,
    wet_level: SharedParam,
    dry_level: SharedParam,
    width: SharedParam,
    freeze: SharedFlag,
}

impl ReverbParams {
    fn new(p: ReverbParameters) -> Self {
        Self {
            room_size: SharedParam::new(p.room_size, 0.0, 1.0),
            damping: SharedParam::new(p.damping, 0.0, 1.0),
            wet_level: SharedParam::new(p.wet_level, 0.0, 1.0),
            dry_level: SharedParam::new(p.dry_level, 0.0, 1.0),
            width: SharedParam::new(p.width, 0.0, 1.0),
            freeze: SharedFlag::new(p.freeze),
        }
    }

    fn snapshot(&self) -> ReverbParameters {
        ReverbParameters {
            room_size: self.room_size.get(),
            damping: self.damping.get(),
            wet_level: self.wet_level.get(),
            dry_level: self.dry_level.get(),
            width: self.width.get(),
            freeze: self.freeze.get(),
        }
    }

    /// Clear every dirty flag; true if any was raised.
    fn take_any(&self) -> bool {
        // no short-circuit: every flag must be cleared
        let flags = [
            self.room_size.take().is_some(),
            self.damping.take().is_some(),
            self.wet_level.take().is_some(),
            self.dry_level.take().is_some(),
            self.width.take().is_some(),
            self.freeze.take().is_some(),
        ];
        flags.contains(&true)
    }
}

/// Thread-safe handle to a [`ReverbStage`]'s parameters.
#[derive(Debug, Clone)]
pub struct ReverbControl {
    params: Arc<ReverbParams>,
}

impl ReverbControl {
    /// Request a new room size, clamped to `[0, 1]`.
    pub fn set_room_size(&self, room_size: f32) {
        self.params.room_size.set(room_size);
    }

    /// Most recently requested room size.
    pub fn room_size(&self) -> f32 {
        self.params.room_size.get()
    }

    /// Request a new damping amount, clamped to `[0, 1]`.
    pub fn set_damping(&self, damping: f32) {
        self.params.damping.set(damping);
    }

    /// Request a new wet level, clamped to `[0, 1]`.
    pub fn set_wet_level(&self, level: f32) {
        self.params.wet_level.set(level);
    }

    /// Request a new dry level, clamped to `[0, 1]`.
    pub fn set_dry_level(&self, level: f32) {
        self.params.dry_level.set(level);
    }

    /// Request a new stereo width, clamped to `[0, 1]`.
    pub fn set_width(&self, width: f32) {
        self.params.width.set(width);
    }

    /// Freeze or release the tail.
    pub fn set_freeze(&self, freeze: bool) {
        self.params.freeze.set(freeze);
    }

    /// Most recently requested value of every parameter.
    pub fn parameters(&self) -> ReverbParameters {
        self.params.snapshot()
    }

    /// Request every parameter at once.
    pub fn set_parameters(&self, p: ReverbParameters) {
        self.set_room_size(p.room_size);
        self.set_damping(p.damping);
        self.set_wet_level(p.wet_level);
        self.set_dry_level(p.dry_level);
        self.set_width(p.width);
        self.set_freeze(p.freeze);
    }
}

/// Reverb pipeline stage.
#[derive(Debug)]
pub struct ReverbStage {
    reverb: Reverb,
    params: Arc<ReverbParams>,
}

impl ReverbStage {
    /// Create a stage with initial parameters (clamped).
    pub fn new(parameters: ReverbParameters) -> Self {
        let parameters = parameters.clamped();
        let mut reverb = Reverb::new();
        reverb.set_parameters(parameters);
        reverb.snap();
        Self {
            reverb,
            params: Arc::new(ReverbParams::new(parameters)),
        }
    }

    /// Create a stage with default parameters and the given room size.
    pub fn with_room_size(room_size: f32) -> Self {
        Self::new(ReverbParameters {
            room_size,
            ..ReverbParameters::default()
        })
    }

    /// Handle for changing parameters from another thread.
    pub fn control(&self) -> ReverbControl {
        ReverbControl {
            params: Arc::clone(&self.params),
        }
    }

    /// The underlying reverberator.
    pub fn reverb(&self) -> &Reverb {
        &self.reverb
    }
}

impl Default for ReverbStage {
    fn default() -> Self {
        Self::new(ReverbParameters::default())
    }
}

impl Stage for ReverbStage {
    fn name(&self) -> &'static str {
        "reverb"
    }

    fn configure(&mut self, config: &StreamConfig) {
        self.params.take_any();
        self.reverb.configure_stream(config);
        self.reverb.set_parameters(self.params.snapshot());
        self.reverb.snap();
    }

    fn apply_pending_changes(&mut self) {
        if self.params.take_any() {
            let parameters = self.params.snapshot();
            self.reverb.set_parameters(parameters);

            #[cfg(feature = "tracing")]
            tracing::debug!(?parameters, "reverb parameters applied");
        }
    }

    fn process(&mut self, block: &mut [&mut [f32]], bypassed: bool) {
        if bypassed {
            assert_eq!(block.len(), self.reverb.num_channels(), "channel count mismatch");
            return;
        }
        self.reverb.process(block);
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }

    fn tail_samples(&self) -> usize {
        self.reverb.tail_samples()
    }
}

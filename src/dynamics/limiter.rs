//! Safety limiter for keeping peaks at or below full scale.

use super::follower::EnvelopeFollower;
use super::settings::LimiterSettings;
use crate::Signal;
use crate::level::{gain_to_db, peak};

/// Result of limiting one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterFrame {
    /// Envelope amplitude at this sample
    pub amplitude: f64,
    /// Gain applied to this sample, in (0, 1]
    pub gain: f64,
    /// Limited output sample
    pub out: f64,
}

/// Safety limiter that holds a signal's peaks at or below 1.0.
///
/// The limiter follows the signal's peak envelope with instant attack, a hold
/// plateau and an exponential release, and divides each sample by the
/// envelope whenever the envelope rises above unity. It never boosts: if the
/// input stays within [-1, 1] the output is identical to the input.
///
/// One instance processes one channel.
///
/// # Examples
///
/// ```
/// use safety_limiter::SafetyLimiter;
///
/// let mut limiter = SafetyLimiter::new(48000.0);
/// assert_eq!(limiter.process(0.5), 0.5);
/// assert_eq!(limiter.process(4.0), 1.0);
/// // The envelope is held, so the quieter sample is scaled by the same gain
/// assert_eq!(limiter.process(2.0), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct SafetyLimiter {
    sample_rate: f64,
    settings: LimiterSettings,
    follower: EnvelopeFollower,
    gain: f64,
}

impl SafetyLimiter {
    /// Creates a limiter with the default 100ms release and 100ms hold.
    pub fn new(sample_rate: f64) -> Self {
        Self::with_settings(sample_rate, LimiterSettings::default())
    }

    /// Creates a limiter with explicit timing.
    ///
    /// Out-of-range times are clamped (see `LimiterSettings`) and reported
    /// once through `log::warn!`.
    pub fn with_settings(sample_rate: f64, settings: LimiterSettings) -> Self {
        warn_if_degenerate(&settings);
        Self {
            sample_rate,
            settings,
            follower: EnvelopeFollower::new(
                settings.release_coefficient(sample_rate),
                settings.hold_samples(sample_rate),
            ),
            gain: 1.0,
        }
    }

    pub fn set_release_time(&mut self, release_time: f64) {
        self.settings.release_time = release_time;
        warn_if_degenerate(&self.settings);
        self.follower
            .set_release_coefficient(self.settings.release_coefficient(self.sample_rate));
    }

    pub fn set_hold_time(&mut self, hold_time: f64) {
        self.settings.hold_time = hold_time;
        warn_if_degenerate(&self.settings);
        self.follower
            .set_hold_samples(self.settings.hold_samples(self.sample_rate));
    }

    pub fn settings(&self) -> LimiterSettings {
        self.settings
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Limits one sample and reports the envelope and gain behind it.
    pub fn step(&mut self, input: f64) -> LimiterFrame {
        let amplitude = self.follower.process(input);
        let gain = if amplitude > 1.0 {
            1.0 / amplitude
        } else {
            1.0
        };
        self.gain = gain;

        // The original sample is scaled, not the sanitized one
        LimiterFrame {
            amplitude,
            gain,
            out: input * gain,
        }
    }

    /// Limits one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.step(input).out
    }

    /// Envelope amplitude after the last sample.
    pub fn amplitude(&self) -> f64 {
        self.follower.amplitude()
    }

    /// Gain applied to the last sample (1.0 means no reduction).
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Clears the envelope and hold timer.
    pub fn reset(&mut self) {
        self.follower.reset();
        self.gain = 1.0;
    }
}

fn warn_if_degenerate(settings: &LimiterSettings) {
    if settings.is_degenerate() {
        log::warn!(
            "limiter settings out of range (release {}s, hold {}s), clamping",
            settings.release_time,
            settings.hold_time
        );
    }
}

/// Every trace produced by `limit`, index-aligned with the input signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimiterOutput {
    /// Envelope amplitude per sample
    pub amplitude: Vec<f64>,
    /// Gain per sample, in (0, 1]
    pub gain: Vec<f64>,
    /// Limited signal
    pub out: Vec<f64>,
}

impl LimiterOutput {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            amplitude: Vec::with_capacity(capacity),
            gain: Vec::with_capacity(capacity),
            out: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, frame: LimiterFrame) {
        self.amplitude.push(frame.amplitude);
        self.gain.push(frame.gain);
        self.out.push(frame.out);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Largest gain reduction applied anywhere in the signal, in dB
    /// (0.0 when the limiter never engaged).
    pub fn peak_gain_reduction_db(&self) -> f64 {
        let min_gain = self.gain.iter().copied().fold(1.0, f64::min);
        -gain_to_db(min_gain)
    }

    /// Largest absolute output sample.
    pub fn peak(&self) -> f64 {
        peak(&self.out)
    }
}

/// Limits a whole signal in one pass.
///
/// A fresh limiter is used for every call, so no state leaks between calls.
/// The input is never modified.
///
/// # Examples
///
/// ```
/// use safety_limiter::{LimiterSettings, limit};
///
/// let signal = [0.5, 2.0, -4.0, 0.25];
/// let result = limit(&signal, 48000.0, LimiterSettings::default());
/// assert_eq!(result.len(), signal.len());
/// assert_eq!(result.out, vec![0.5, 1.0, -1.0, 0.0625]);
/// assert_eq!(result.gain, vec![1.0, 0.5, 0.25, 0.25]);
/// ```
pub fn limit(signal: &[f64], sample_rate: f64, settings: LimiterSettings) -> LimiterOutput {
    let mut limiter = SafetyLimiter::with_settings(sample_rate, settings);
    let mut output = LimiterOutput::with_capacity(signal.len());
    for &sample in signal {
        output.push(limiter.step(sample));
    }
    output
}

/// Applies a `SafetyLimiter` to any signal source.
///
/// # Examples
///
/// ```
/// use safety_limiter::{LimiterSettings, Signal, SignalExt, SineOscillator};
///
/// let mut limited = SineOscillator::new(440.0, 48000.0)
///     .gain(8.0)
///     .limit(48000.0, LimiterSettings::default());
/// let samples = limited.take_samples(4800);
/// assert!(samples.iter().all(|x| x.abs() <= 1.0));
/// ```
pub struct Limiter<S: Signal> {
    source: S,
    limiter: SafetyLimiter,
}

impl<S: Signal> Limiter<S> {
    pub fn new(source: S, sample_rate: f64, settings: LimiterSettings) -> Self {
        Self {
            source,
            limiter: SafetyLimiter::with_settings(sample_rate, settings),
        }
    }

    /// Gets the current gain reduction multiplier (0.0-1.0).
    pub fn current_gain(&self) -> f64 {
        self.limiter.gain()
    }

    /// Gets the current envelope amplitude.
    pub fn current_amplitude(&self) -> f64 {
        self.limiter.amplitude()
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: Signal> Signal for Limiter<S> {
    fn next_sample(&mut self) -> f64 {
        let input = self.source.next_sample();
        self.limiter.process(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Samples;

    #[test]
    fn test_unity_below_threshold() {
        let mut limiter = SafetyLimiter::new(44100.0);
        for &x in &[0.0, 0.3, -0.9, 1.0, -1.0, 0.01] {
            assert_eq!(limiter.process(x), x);
            assert_eq!(limiter.gain(), 1.0);
        }
    }

    #[test]
    fn test_gain_cancels_envelope() {
        let mut limiter = SafetyLimiter::new(44100.0);
        let frame = limiter.step(-3.0);
        assert_eq!(frame.amplitude, 3.0);
        assert_eq!(frame.gain, 1.0 / 3.0);
        assert!((frame.out + 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_gain_recovers_after_release() {
        let sample_rate = 1000.0;
        let settings = LimiterSettings::new(0.01, 0.005);
        let mut limiter = SafetyLimiter::with_settings(sample_rate, settings);
        limiter.process(2.0);
        // 5 hold samples + 10 release samples take the envelope from 2.0 to 0.002
        for _ in 0..15 {
            limiter.process(0.0);
        }
        assert!((limiter.amplitude() - 0.002).abs() < 1e-9);
        assert_eq!(limiter.gain(), 1.0);
    }

    #[test]
    fn test_setters_update_envelope() {
        let mut limiter = SafetyLimiter::new(1000.0);
        limiter.set_hold_time(0.0);
        limiter.set_release_time(0.0);
        assert_eq!(limiter.settings(), LimiterSettings::new(0.0, 0.0));
        limiter.process(4.0);
        // Zero release: the envelope drops straight back to the input
        assert_eq!(limiter.step(0.5).gain, 1.0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut limiter = SafetyLimiter::new(48000.0);
        limiter.process(10.0);
        assert!(limiter.gain() < 1.0);
        limiter.reset();
        assert_eq!(limiter.amplitude(), 0.0);
        assert_eq!(limiter.gain(), 1.0);
        assert_eq!(limiter.process(0.5), 0.5);
    }

    #[test]
    fn test_limit_traces_have_signal_length() {
        let signal: Vec<f64> = (0..257).map(|i| (i as f64 * 0.1).sin() * 3.0).collect();
        let result = limit(&signal, 8000.0, LimiterSettings::default());
        assert_eq!(result.amplitude.len(), signal.len());
        assert_eq!(result.gain.len(), signal.len());
        assert_eq!(result.out.len(), signal.len());
        assert!(result.gain.iter().all(|&g| g > 0.0 && g <= 1.0));
    }

    #[test]
    fn test_limit_empty_signal() {
        let result = limit(&[], 48000.0, LimiterSettings::default());
        assert!(result.is_empty());
        assert_eq!(result.peak(), 0.0);
        assert_eq!(result.peak_gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_peak_gain_reduction() {
        let result = limit(&[0.1, 2.0, 0.1], 48000.0, LimiterSettings::default());
        assert!((result.peak_gain_reduction_db() - 6.020599913279624).abs() < 1e-9);
        assert!((result.peak() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_adapter_matches_batch() {
        let signal: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.05).sin() * 2.5).collect();
        let settings = LimiterSettings::new(0.02, 0.01);
        let batch = limit(&signal, 8000.0, settings);

        let mut adapter = Limiter::new(Samples::new(signal.clone()), 8000.0, settings);
        let streamed = adapter.take_samples(signal.len());
        assert_eq!(streamed, batch.out);
        assert_eq!(adapter.current_gain(), *batch.gain.last().unwrap());
        assert_eq!(
            adapter.current_amplitude(),
            *batch.amplitude.last().unwrap()
        );
        assert!(adapter.into_inner().is_finished());
    }
}

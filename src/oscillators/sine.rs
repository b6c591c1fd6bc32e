//! Sine wave oscillator implementation.

use crate::Signal;
use std::f64::consts::PI;

/// A sine wave oscillator running at a runtime sample rate.
///
/// Sample `n` is `sin(2π · frequency · n / sample_rate)`, so the first sample
/// is always exactly zero.
///
/// # Examples
///
/// ```
/// use safety_limiter::{Signal, SineOscillator};
///
/// // One second of A4 at 48 kHz
/// let mut osc = SineOscillator::new(440.0, 48000.0);
/// let tone = osc.take_samples(48000);
/// assert_eq!(tone[0], 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SineOscillator {
    frequency: f64,
    sample_rate: f64,
    /// Index of the next sample to generate
    index: u64,
}

impl SineOscillator {
    /// Creates a new sine oscillator.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Frequency of the sine wave in Hz
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(frequency: f64, sample_rate: f64) -> Self {
        Self {
            frequency,
            sample_rate,
            index: 0,
        }
    }

    /// Gets the oscillator frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Gets the sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Restarts the tone from sample zero.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl Signal for SineOscillator {
    fn next_sample(&mut self) -> f64 {
        let t = self.index as f64 / self.sample_rate;
        self.index += 1;
        (t * 2.0 * PI * self.frequency).sin()
    }
}

//! Signal combinators for building test material and gain chains.
//!
//! Fixed gain stages and envelope shaping used around the limiter.

use crate::Signal;
use crate::dynamics::{Limiter, LimiterSettings};
use crate::level::db_to_gain;

/// Multiplies two signals together sample by sample.
///
/// With a `Ramp` as one side this imposes a linear amplitude envelope.
///
/// # Examples
///
/// ```
/// use safety_limiter::{Signal, SineOscillator, combinators::{Multiply, Ramp}};
///
/// let tone = SineOscillator::new(440.0, 48000.0);
/// let mut swell = Multiply::new(tone, Ramp::new(0.0, 1.0, 48000));
/// assert_eq!(swell.next_sample(), 0.0);
/// ```
pub struct Multiply<A: Signal, B: Signal> {
    a: A,
    b: B,
}

impl<A: Signal, B: Signal> Multiply<A, B> {
    /// Creates a new Multiply combinator.
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: Signal, B: Signal> Signal for Multiply<A, B> {
    fn next_sample(&mut self) -> f64 {
        self.a.next_sample() * self.b.next_sample()
    }
}

/// Applies a fixed gain to a signal.
pub struct Gain<S: Signal> {
    pub source: S,
    pub gain: f64,
}

impl<S: Signal> Gain<S> {
    pub fn new(source: S, gain: f64) -> Self {
        Self { source, gain }
    }

    /// Creates a gain stage from a level in decibels.
    pub fn from_db(source: S, db: f64) -> Self {
        Self::new(source, db_to_gain(db))
    }
}

impl<S: Signal> Signal for Gain<S> {
    fn next_sample(&mut self) -> f64 {
        self.source.next_sample() * self.gain
    }
}

/// Linear ramp from `start` to `end` across `len` samples, then holds `end`.
///
/// Sample `i` is `start + (end - start) * i / (len - 1)`, so both endpoints
/// are hit exactly.
///
/// # Examples
///
/// ```
/// use safety_limiter::{Signal, combinators::Ramp};
///
/// let mut ramp = Ramp::new(1.0, 2.0, 5);
/// assert_eq!(ramp.take_samples(6), vec![1.0, 1.25, 1.5, 1.75, 2.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Ramp {
    start: f64,
    end: f64,
    len: usize,
    index: usize,
}

impl Ramp {
    pub fn new(start: f64, end: f64, len: usize) -> Self {
        Self {
            start,
            end,
            len,
            index: 0,
        }
    }
}

impl Signal for Ramp {
    fn next_sample(&mut self) -> f64 {
        let value = match self.len {
            0 => self.end,
            1 if self.index == 0 => self.start,
            _ if self.index + 1 >= self.len => self.end,
            _ => {
                let t = self.index as f64 / (self.len - 1) as f64;
                self.start + (self.end - self.start) * t
            }
        };
        self.index = self.index.saturating_add(1);
        value
    }
}

/// Extension trait providing combinator methods for all signals.
pub trait SignalExt: Signal + Sized {
    /// Multiplies this signal with another signal.
    fn multiply<S: Signal>(self, other: S) -> Multiply<Self, S> {
        Multiply::new(self, other)
    }

    /// Scales this signal by a linear factor.
    fn gain(self, gain: f64) -> Gain<Self> {
        Gain::new(self, gain)
    }

    /// Scales this signal by a level in decibels.
    fn gain_db(self, db: f64) -> Gain<Self> {
        Gain::from_db(self, db)
    }

    /// Runs this signal through a safety limiter.
    fn limit(self, sample_rate: f64, settings: LimiterSettings) -> Limiter<Self> {
        Limiter::new(self, sample_rate, settings)
    }
}

impl<T: Signal> SignalExt for T {}

//! Core signal trait.
//!
//! This module provides the `Signal` trait that represents any sample source
//! or processor, plus `Samples`, a source that plays back a recorded buffer.

/// Common interface for all signal sources and processors.
///
/// The trait provides three operations:
/// - Single sample generation via `next_sample()`
/// - Batch processing into a caller buffer via `process()`
/// - Collecting a fixed number of samples via `take_samples()`
pub trait Signal {
    /// Generates the next sample from the signal.
    ///
    /// # Returns
    ///
    /// A sample value, nominally between -1.0 and 1.0 for clean audio
    fn next_sample(&mut self) -> f64;

    /// Generates multiple samples into a buffer.
    ///
    /// Default implementation calls `next_sample()` for each element.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Mutable slice to fill with samples
    fn process(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Renders the next `len` samples into a new vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use safety_limiter::Signal;
    ///
    /// let mut constant = 0.25_f64;
    /// assert_eq!(constant.take_samples(3), vec![0.25, 0.25, 0.25]);
    /// ```
    fn take_samples(&mut self, len: usize) -> Vec<f64> {
        let mut buffer = vec![0.0; len];
        self.process(&mut buffer);
        buffer
    }
}

/// A constant signal value.
///
/// # Examples
///
/// ```
/// use safety_limiter::Signal;
///
/// let mut constant = 0.5_f64;
/// assert_eq!(constant.next_sample(), 0.5);
///
/// let mut buffer = vec![0.0; 4];
/// constant.process(&mut buffer);
/// assert_eq!(buffer, vec![0.5, 0.5, 0.5, 0.5]);
/// ```
impl Signal for f64 {
    fn next_sample(&mut self) -> f64 {
        *self
    }

    fn process(&mut self, buffer: &mut [f64]) {
        buffer.fill(*self);
    }
}

/// Plays back a recorded buffer, then silence.
///
/// Useful for pushing a decoded channel through a chain of streaming
/// processors.
///
/// # Examples
///
/// ```
/// use safety_limiter::{Samples, Signal};
///
/// let mut source = Samples::new(vec![0.1, 0.2]);
/// assert_eq!(source.take_samples(3), vec![0.1, 0.2, 0.0]);
/// assert!(source.is_finished());
/// ```
#[derive(Debug, Clone)]
pub struct Samples {
    data: Vec<f64>,
    position: usize,
}

impl Samples {
    /// Creates a source that yields `data` in order.
    pub fn new(data: Vec<f64>) -> Self {
        Self { data, position: 0 }
    }

    /// Number of samples left before the source runs dry.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// True once every recorded sample has been played.
    pub fn is_finished(&self) -> bool {
        self.position >= self.data.len()
    }
}

impl Signal for Samples {
    fn next_sample(&mut self) -> f64 {
        match self.data.get(self.position) {
            Some(&sample) => {
                self.position += 1;
                sample
            }
            None => 0.0,
        }
    }
}

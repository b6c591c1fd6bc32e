//! Harmonic distortion measurement.
//!
//! The analyzer slices a signal into overlapping Hann-windowed frames, takes
//! the magnitude spectrum of each, estimates the energy around every harmonic
//! partial of a known fundamental, and averages the per-frame THD.

mod spectrum;
mod thd;
mod window;

pub use spectrum::Spectrum;
pub use thd::{
    BIN_RADIUS, FRAME_SIZE, HOP_SIZE, ThdAnalyzer, ThdSettings, check_partials, measure_thd,
};
pub use window::hann_periodic;

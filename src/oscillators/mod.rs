//! Test-tone oscillators.
//!
//! Tones are generated from the absolute sample index rather than an
//! accumulated phase, so long renders carry no drift.

mod sine;

pub use sine::SineOscillator;

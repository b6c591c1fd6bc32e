//! Safety limiter - keeps audio peaks at or below full scale
//!
//! This library provides a peak limiter built on an attack/hold/release
//! envelope follower, and a harmonic-distortion analyzer for checking how
//! transparent the limiting is.
//!
//! ```
//! use safety_limiter::{LimiterSettings, Signal, SineOscillator, limit, measure_thd};
//!
//! let sample_rate = 48000.0;
//! let loud: Vec<f64> = SineOscillator::new(440.0, sample_rate)
//!     .take_samples(48000)
//!     .iter()
//!     .map(|x| x * 8.0)
//!     .collect();
//!
//! let limited = limit(&loud, sample_rate, LimiterSettings::default());
//! assert!(limited.peak() <= 1.0 + 1e-12);
//!
//! let before = measure_thd(&loud, sample_rate, 440.0, 8).unwrap();
//! let after = measure_thd(&limited.out, sample_rate, 440.0, 8).unwrap();
//! assert!(after - before < 0.001);
//! ```

pub mod analysis;
pub mod combinators;
pub mod dynamics;
pub mod error;
pub mod level;
pub mod oscillators;
#[cfg(feature = "wav")]
pub mod pipeline;
pub mod signal;
#[cfg(feature = "wav")]
pub mod wav;

// Re-export commonly used types at the crate root
pub use analysis::{ThdAnalyzer, ThdSettings, measure_thd};
pub use combinators::{Gain, Multiply, Ramp, SignalExt};
pub use dynamics::{Limiter, LimiterOutput, LimiterSettings, SafetyLimiter, limit};
pub use error::{Error, Result};
pub use oscillators::SineOscillator;
pub use signal::{Samples, Signal};

//! Limiter timing configuration.

use crate::level::db_to_gain;

/// Default release time in seconds.
pub const DEFAULT_RELEASE_TIME: f64 = 0.1;

/// Default hold time in seconds.
pub const DEFAULT_HOLD_TIME: f64 = 0.1;

/// Level the release stage decays to over one release time, in dBFS.
pub const RELEASE_FLOOR_DB: f64 = -60.0;

/// Timing parameters for the limiter envelope.
///
/// # Examples
///
/// ```
/// use safety_limiter::LimiterSettings;
///
/// let settings = LimiterSettings::default()
///     .with_release_time(0.05)
///     .with_hold_time(0.02);
/// assert_eq!(settings.hold_samples(48000.0), 960);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterSettings {
    /// Time for the envelope to fall by 60 dB once the hold expires, in seconds
    pub release_time: f64,
    /// Time the envelope stays flat after each peak, in seconds
    pub hold_time: f64,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            release_time: DEFAULT_RELEASE_TIME,
            hold_time: DEFAULT_HOLD_TIME,
        }
    }
}

impl LimiterSettings {
    pub fn new(release_time: f64, hold_time: f64) -> Self {
        Self {
            release_time,
            hold_time,
        }
    }

    pub fn with_release_time(mut self, release_time: f64) -> Self {
        self.release_time = release_time;
        self
    }

    pub fn with_hold_time(mut self, hold_time: f64) -> Self {
        self.hold_time = hold_time;
        self
    }

    /// Per-sample multiplier that takes a pure exponential decay from unity
    /// down to `RELEASE_FLOOR_DB` in exactly `release_time` seconds.
    ///
    /// A release time that is zero, negative or NaN yields 0, meaning the
    /// envelope jumps straight to the input once the hold expires.
    pub fn release_coefficient(&self, sample_rate: f64) -> f64 {
        let release_samples = self.release_time * sample_rate;
        if release_samples > 0.0 {
            db_to_gain(RELEASE_FLOOR_DB).powf(1.0 / release_samples)
        } else {
            0.0
        }
    }

    /// Hold time rounded to whole samples. Negative or NaN gives 0.
    pub fn hold_samples(&self, sample_rate: f64) -> usize {
        let samples = (self.hold_time * sample_rate).round();
        if samples > 0.0 { samples as usize } else { 0 }
    }

    /// True when either time is outside its domain and will be clamped.
    pub fn is_degenerate(&self) -> bool {
        self.release_time.is_nan()
            || self.release_time <= 0.0
            || self.hold_time.is_nan()
            || self.hold_time < 0.0
    }
}

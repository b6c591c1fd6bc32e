//! Attack/hold/release envelope follower.

/// Replaces NaN, infinite and subnormal values with exactly zero.
///
/// # Examples
///
/// ```
/// use safety_limiter::dynamics::sanitize;
///
/// assert_eq!(sanitize(f64::NAN), 0.0);
/// assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
/// assert_eq!(sanitize(f64::MIN_POSITIVE / 2.0), 0.0);
/// assert_eq!(sanitize(-0.5), -0.5);
/// ```
#[inline]
pub fn sanitize(x: f64) -> f64 {
    if !x.is_finite() || x.abs() < f64::MIN_POSITIVE {
        0.0
    } else {
        x
    }
}

/// Which branch the follower takes for the next sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerPhase {
    /// The envelope is frozen at the last peak
    Hold,
    /// The envelope decays exponentially toward the input
    Release,
}

/// Peak envelope follower with instant attack, a hold plateau and a one-pole
/// release.
///
/// Every time the rectified input reaches the envelope the hold timer is
/// re-armed, so sustained or rising material produces a flat plateau and the
/// envelope only starts decaying once the input has stayed below it for the
/// whole hold time.
///
/// Both the input and the stored amplitude pass through `sanitize`, so a
/// single NaN or infinite sample can never poison later output.
///
/// # Examples
///
/// ```
/// use safety_limiter::dynamics::{EnvelopeFollower, FollowerPhase};
///
/// let mut follower = EnvelopeFollower::new(0.5, 2);
/// assert_eq!(follower.process(1.0), 1.0); // attack
/// assert_eq!(follower.phase(), FollowerPhase::Hold);
/// assert_eq!(follower.process(0.0), 1.0); // hold
/// assert_eq!(follower.process(0.0), 1.0); // hold
/// assert_eq!(follower.process(0.0), 0.5); // release
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    k_release: f64,
    hold_samples: usize,
    last_amplitude: f64,
    hold_timer: usize,
}

impl EnvelopeFollower {
    /// Creates a follower at rest.
    ///
    /// # Arguments
    ///
    /// * `k_release` - Per-sample release multiplier in [0, 1]
    /// * `hold_samples` - Length of the hold plateau after each peak
    pub fn new(k_release: f64, hold_samples: usize) -> Self {
        Self {
            k_release,
            hold_samples,
            last_amplitude: 0.0,
            hold_timer: 0,
        }
    }

    /// Feeds one sample and returns the envelope amplitude at that sample.
    pub fn process(&mut self, sample: f64) -> f64 {
        let instant = sanitize(sample).abs();

        let from_follower = if self.hold_timer > 0 {
            self.hold_timer -= 1;
            self.last_amplitude
        } else {
            self.last_amplitude * self.k_release + instant * (1.0 - self.k_release)
        };

        let amplitude = if from_follower > instant {
            from_follower
        } else {
            self.hold_timer = self.hold_samples;
            instant
        };

        self.last_amplitude = sanitize(amplitude);
        amplitude
    }

    /// Phase the next sample will be processed in.
    pub fn phase(&self) -> FollowerPhase {
        if self.hold_timer > 0 {
            FollowerPhase::Hold
        } else {
            FollowerPhase::Release
        }
    }

    /// Envelope amplitude after the last processed sample.
    pub fn amplitude(&self) -> f64 {
        self.last_amplitude
    }

    /// Samples left on the hold timer.
    pub fn hold_remaining(&self) -> usize {
        self.hold_timer
    }

    pub fn release_coefficient(&self) -> f64 {
        self.k_release
    }

    pub fn hold_samples(&self) -> usize {
        self.hold_samples
    }

    /// Changes the release multiplier. Takes effect on the next sample.
    pub fn set_release_coefficient(&mut self, k_release: f64) {
        self.k_release = k_release;
    }

    /// Changes the plateau length. A hold already in progress keeps counting
    /// down from its old value.
    pub fn set_hold_samples(&mut self, hold_samples: usize) {
        self.hold_samples = hold_samples;
    }

    /// Returns to the initial state: zero amplitude, no hold pending.
    pub fn reset(&mut self) {
        self.last_amplitude = 0.0;
        self.hold_timer = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_normal_values() {
        assert_eq!(sanitize(1.5), 1.5);
        assert_eq!(sanitize(-1e-300), -1e-300);
        assert_eq!(sanitize(f64::MIN_POSITIVE), f64::MIN_POSITIVE);
        assert_eq!(sanitize(0.0), 0.0);
    }

    #[test]
    fn test_sanitize_zeroes_degenerate_values() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(-f64::MIN_POSITIVE / 4.0), 0.0);
    }

    #[test]
    fn test_silence_stays_at_zero() {
        let mut follower = EnvelopeFollower::new(0.9, 10);
        for _ in 0..100 {
            assert_eq!(follower.process(0.0), 0.0);
        }
    }

    #[test]
    fn test_hold_then_release() {
        let mut follower = EnvelopeFollower::new(0.5, 3);
        assert_eq!(follower.process(-2.0), 2.0);
        assert_eq!(follower.hold_remaining(), 3);
        for _ in 0..3 {
            assert_eq!(follower.process(0.0), 2.0);
        }
        assert_eq!(follower.phase(), FollowerPhase::Release);
        assert_eq!(follower.process(0.0), 1.0);
        assert_eq!(follower.process(0.0), 0.5);
    }

    #[test]
    fn test_release_blends_toward_input() {
        let mut follower = EnvelopeFollower::new(0.5, 0);
        assert_eq!(follower.process(1.0), 1.0);
        // 1.0 * 0.5 + 0.2 * 0.5
        assert!((follower.process(0.2) - 0.6).abs() < 1e-15);
    }

    #[test]
    fn test_peak_during_hold_rearms() {
        let mut follower = EnvelopeFollower::new(0.5, 4);
        follower.process(1.0);
        follower.process(0.0);
        follower.process(0.0);
        assert_eq!(follower.hold_remaining(), 2);
        assert_eq!(follower.process(1.0), 1.0);
        assert_eq!(follower.hold_remaining(), 4);
    }

    #[test]
    fn test_nan_does_not_poison_state() {
        let mut follower = EnvelopeFollower::new(0.5, 0);
        follower.process(1.0);
        let amplitude = follower.process(f64::NAN);
        assert!(amplitude.is_finite());
        assert!(follower.amplitude().is_finite());
        assert!(follower.process(0.0).is_finite());
    }

    #[test]
    fn test_zero_release_coefficient_tracks_input() {
        let mut follower = EnvelopeFollower::new(0.0, 0);
        assert_eq!(follower.process(0.8), 0.8);
        assert_eq!(follower.process(0.3), 0.3);
        assert_eq!(follower.process(-0.1), 0.1);
    }

    #[test]
    fn test_reset() {
        let mut follower = EnvelopeFollower::new(0.5, 10);
        follower.process(3.0);
        follower.reset();
        assert_eq!(follower.amplitude(), 0.0);
        assert_eq!(follower.hold_remaining(), 0);
        assert_eq!(follower.phase(), FollowerPhase::Release);
    }
}

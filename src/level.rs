//! Decibel conversions and the pre-limiter gain stage.

/// Converts decibels to a linear amplitude factor.
///
/// # Examples
///
/// ```
/// use safety_limiter::level::db_to_gain;
///
/// assert_eq!(db_to_gain(0.0), 1.0);
/// assert!((db_to_gain(-60.0) - 0.001).abs() < 1e-15);
/// ```
pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Converts a linear amplitude factor to decibels.
///
/// Non-positive input maps to negative infinity.
pub fn gain_to_db(gain: f64) -> f64 {
    20.0 * gain.log10()
}

/// Applies a gain given in decibels, returning a new signal.
///
/// This is the amplification stage that typically sits in front of the
/// limiter to push material into it.
///
/// # Examples
///
/// ```
/// use safety_limiter::level::amplify;
///
/// let louder = amplify(&[0.1, -0.1], 20.0);
/// assert!((louder[0] - 1.0).abs() < 1e-12);
/// ```
pub fn amplify(signal: &[f64], db: f64) -> Vec<f64> {
    let gain = db_to_gain(db);
    signal.iter().map(|&x| x * gain).collect()
}

/// Largest absolute sample, 0.0 for an empty signal.
pub fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0, |acc, &x| acc.max(x.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_round_trip_points() {
        assert!((db_to_gain(6.0) - 1.9952623149688795).abs() < 1e-12);
        assert!((gain_to_db(2.0) - 6.020599913279624).abs() < 1e-12);
        assert_eq!(gain_to_db(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_amplify_zero_db_is_identity() {
        let signal = [0.5, -0.25, 0.0];
        assert_eq!(amplify(&signal, 0.0), signal.to_vec());
    }

    #[test]
    fn test_peak() {
        assert_eq!(peak(&[]), 0.0);
        assert_eq!(peak(&[0.25, -0.75, 0.5]), 0.75);
    }
}

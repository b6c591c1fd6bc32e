//! Analysis windows.

use std::f64::consts::PI;

/// Periodic Hann window of length `len`.
///
/// The periodic form divides by `len` rather than `len - 1`, which is the
/// variant suited to FFT analysis: the window tiles exactly at 50% overlap.
///
/// # Examples
///
/// ```
/// use safety_limiter::analysis::hann_periodic;
///
/// let window = hann_periodic(4);
/// assert_eq!(window[0], 0.0);
/// assert!((window[2] - 1.0).abs() < 1e-15);
/// ```
pub fn hann_periodic(len: usize) -> Vec<f64> {
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / len as f64).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_windows_sum_to_one() {
        let len = 2048;
        let hop = len / 2;
        let window = hann_periodic(len);
        for n in 0..hop {
            let sum = window[n] + window[n + hop];
            assert!((sum - 1.0).abs() < 1e-12, "sum at {} is {}", n, sum);
        }
    }

    #[test]
    fn test_symmetry_about_center() {
        let window = hann_periodic(16);
        for n in 1..8 {
            assert!((window[n] - window[16 - n]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_empty() {
        assert!(hann_periodic(0).is_empty());
    }
}

//! Magnitude spectrum of one analysis frame.

use rustfft::Fft;
use rustfft::num_complex::Complex;

/// Non-negative-frequency magnitude spectrum of a real frame.
///
/// Holds `frame_size / 2 + 1` bins; bin `k` is centered on
/// `k * sample_rate / frame_size` Hz.
#[derive(Debug, Clone)]
pub struct Spectrum {
    magnitudes: Vec<f64>,
    bin_width: f64,
}

impl Spectrum {
    /// Windows `frame` and transforms it with `fft`.
    ///
    /// `window` and `fft` must both match the frame length.
    pub(crate) fn analyze(
        frame: &[f64],
        window: &[f64],
        fft: &dyn Fft<f64>,
        sample_rate: f64,
    ) -> Self {
        let mut buffer: Vec<Complex<f64>> = frame
            .iter()
            .zip(window)
            .map(|(&x, &w)| Complex::new(x * w, 0.0))
            .collect();
        fft.process(&mut buffer);

        let frame_size = buffer.len();
        let magnitudes = buffer[..frame_size / 2 + 1]
            .iter()
            .map(|c| c.norm())
            .collect();

        Self::from_magnitudes(magnitudes, frame_size, sample_rate)
    }

    /// Wraps precomputed magnitudes for a frame of `frame_size` samples.
    pub fn from_magnitudes(magnitudes: Vec<f64>, frame_size: usize, sample_rate: f64) -> Self {
        Self {
            magnitudes,
            bin_width: 1.0 / (frame_size as f64 * (1.0 / sample_rate)),
        }
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Spacing between bin centers in Hz.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Center frequency of bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.bin_width
    }

    /// Index of the first bin whose center lies strictly above `frequency`.
    ///
    /// Computed directly as `floor(frequency / bin_width) + 1`, then nudged so
    /// it agrees with a linear scan over `bin_frequency` even where division
    /// rounding lands on the wrong side of a bin center. When no bin lies
    /// above `frequency` the last bin is returned.
    pub fn first_bin_above(&self, frequency: f64) -> usize {
        let last = self.len().saturating_sub(1);
        if frequency < 0.0 {
            return 0;
        }

        let estimate = (frequency / self.bin_width).floor() + 1.0;
        let mut index = if estimate < self.len() as f64 {
            estimate as usize
        } else {
            self.len()
        };

        while index > 0 && self.bin_frequency(index - 1) > frequency {
            index -= 1;
        }
        while index < self.len() && self.bin_frequency(index) <= frequency {
            index += 1;
        }

        index.min(last)
    }

    /// Energy-based amplitude estimate of the partial at `frequency`.
    ///
    /// Takes the root of the summed squared magnitudes over bins
    /// `[index - radius, index + radius)`, where `index` is
    /// `first_bin_above(frequency)`. The range is clamped to the spectrum.
    pub fn partial_amplitude(&self, frequency: f64, radius: usize) -> f64 {
        let index = self.first_bin_above(frequency);
        let low = index.saturating_sub(radius);
        let high = (index + radius).min(self.len());
        self.magnitudes[low..high]
            .iter()
            .map(|m| m * m)
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;

    fn linear_scan(spectrum: &Spectrum, frequency: f64) -> usize {
        let mut found = spectrum.len() - 1;
        for k in 0..spectrum.len() {
            if spectrum.bin_frequency(k) > frequency {
                found = k;
                break;
            }
        }
        found
    }

    #[test]
    fn test_first_bin_above_matches_scan() {
        let spectrum = Spectrum::from_magnitudes(vec![0.0; 1025], 2048, 48000.0);
        for frequency in [0.0, 23.4375, 46.875, 440.0, 3520.0, 11999.0, 23976.5625] {
            assert_eq!(
                spectrum.first_bin_above(frequency),
                linear_scan(&spectrum, frequency),
                "mismatch at {} Hz",
                frequency
            );
        }
    }

    #[test]
    fn test_bin_center_is_not_above_itself() {
        let spectrum = Spectrum::from_magnitudes(vec![0.0; 1025], 2048, 48000.0);
        let center = spectrum.bin_frequency(18);
        assert_eq!(spectrum.first_bin_above(center), 19);
        assert_eq!(spectrum.first_bin_above(center - 1e-6), 18);
    }

    #[test]
    fn test_no_bin_above_returns_last() {
        let spectrum = Spectrum::from_magnitudes(vec![0.0; 1025], 2048, 48000.0);
        assert_eq!(spectrum.first_bin_above(24000.0), 1024);
        assert_eq!(spectrum.first_bin_above(1e9), 1024);
    }

    #[test]
    fn test_partial_amplitude_sums_four_bins() {
        let magnitudes = vec![0.0, 0.0, 1.0, 2.0, 2.0, 4.0, 9.0, 0.0, 0.0];
        let spectrum = Spectrum::from_magnitudes(magnitudes, 16, 16.0);
        // 3.5 Hz -> first bin above is 4 -> bins 2..6
        let amplitude = spectrum.partial_amplitude(3.5, 2);
        assert!((amplitude - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_amplitude_clamps_low_edge() {
        let magnitudes = vec![3.0, 4.0, 0.0, 7.0];
        let spectrum = Spectrum::from_magnitudes(magnitudes, 6, 6.0);
        // 0.5 Hz -> index 1 -> bins 0..3
        assert!((spectrum.partial_amplitude(0.5, 2) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_bin_centered_tone() {
        let frame_size = 64;
        let sample_rate = 64.0;
        let frame: Vec<f64> = (0..frame_size)
            .map(|n| (2.0 * std::f64::consts::PI * 8.0 * n as f64 / frame_size as f64).cos())
            .collect();
        let window = vec![1.0; frame_size];
        let fft = FftPlanner::<f64>::new().plan_fft_forward(frame_size);
        let spectrum = Spectrum::analyze(&frame, &window, fft.as_ref(), sample_rate);

        assert_eq!(spectrum.len(), frame_size / 2 + 1);
        assert_eq!(spectrum.bin_width(), 1.0);
        assert!((spectrum.magnitudes()[8] - 32.0).abs() < 1e-9);
        assert!(spectrum.magnitudes()[7].abs() < 1e-9);
    }
}

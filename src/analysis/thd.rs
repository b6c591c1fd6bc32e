//! Total harmonic distortion of a tone with a known fundamental.

use std::sync::Arc;

use rustfft::{Fft, FftPlanner};

use super::spectrum::Spectrum;
use super::window::hann_periodic;
use crate::error::{Error, Result};

/// Samples per analysis frame.
pub const FRAME_SIZE: usize = 2048;

/// Samples between consecutive frame starts (50% overlap).
pub const HOP_SIZE: usize = FRAME_SIZE / 2;

/// Bins on each side of a partial that contribute to its amplitude.
pub const BIN_RADIUS: usize = 2;

/// Framing parameters for THD measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThdSettings {
    pub frame_size: usize,
    pub hop_size: usize,
    pub bin_radius: usize,
}

impl Default for ThdSettings {
    fn default() -> Self {
        Self {
            frame_size: FRAME_SIZE,
            hop_size: HOP_SIZE,
            bin_radius: BIN_RADIUS,
        }
    }
}

impl ThdSettings {
    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size;
        self
    }

    pub fn with_bin_radius(mut self, bin_radius: usize) -> Self {
        self.bin_radius = bin_radius;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.frame_size < 2 {
            return Err(Error::InvalidParameter {
                name: "frame_size",
                value: self.frame_size as f64,
            });
        }
        if self.hop_size == 0 {
            return Err(Error::InvalidParameter {
                name: "hop_size",
                value: 0.0,
            });
        }
        if self.bin_radius == 0 {
            return Err(Error::InvalidParameter {
                name: "bin_radius",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Checks that `partials` harmonics of `f0` all sit strictly below Nyquist.
///
/// # Errors
///
/// - `Error::InvalidParameter` if `sample_rate` or `f0` is not a positive
///   finite number, or `partials` is zero
/// - `Error::PartialsExceedNyquist` if `f0 * partials >= sample_rate / 2`
pub fn check_partials(sample_rate: f64, f0: f64, partials: usize) -> Result<()> {
    check_sample_rate(sample_rate)?;
    if !f0.is_finite() || f0 <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "f0",
            value: f0,
        });
    }
    if partials == 0 {
        return Err(Error::InvalidParameter {
            name: "partials",
            value: 0.0,
        });
    }

    let nyquist = sample_rate * 0.5;
    if f0 * partials as f64 >= nyquist {
        return Err(Error::PartialsExceedNyquist {
            f0,
            partials,
            nyquist,
        });
    }
    Ok(())
}

fn check_sample_rate(sample_rate: f64) -> Result<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "sample_rate",
            value: sample_rate,
        });
    }
    Ok(())
}

/// Measures THD (in percent) with the default framing.
///
/// Equivalent to `ThdAnalyzer::new(sample_rate, ThdSettings::default())`
/// followed by `measure`, except that the partial check runs before the FFT
/// is planned.
///
/// # Examples
///
/// ```
/// use safety_limiter::{Signal, SineOscillator, measure_thd};
///
/// let tone = SineOscillator::new(440.0, 48000.0).take_samples(48000);
/// let thd = measure_thd(&tone, 48000.0, 440.0, 8).unwrap();
/// assert!(thd < 0.01);
///
/// // 60 partials of 440 Hz would reach 26.4 kHz, past Nyquist
/// assert!(measure_thd(&tone, 48000.0, 440.0, 60).is_err());
/// ```
pub fn measure_thd(signal: &[f64], sample_rate: f64, f0: f64, partials: usize) -> Result<f64> {
    check_partials(sample_rate, f0, partials)?;
    ThdAnalyzer::new(sample_rate, ThdSettings::default())?.measure(signal, f0, partials)
}

/// Frame-based THD analyzer.
///
/// Plans the FFT and computes the window once, so one analyzer can score
/// many signals at the same sample rate (typically the input and output of
/// the limiter).
pub struct ThdAnalyzer {
    sample_rate: f64,
    settings: ThdSettings,
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl ThdAnalyzer {
    pub fn new(sample_rate: f64, settings: ThdSettings) -> Result<Self> {
        check_sample_rate(sample_rate)?;
        settings.validate()?;

        let fft = FftPlanner::<f64>::new().plan_fft_forward(settings.frame_size);
        Ok(Self {
            sample_rate,
            settings,
            window: hann_periodic(settings.frame_size),
            fft,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn settings(&self) -> ThdSettings {
        self.settings
    }

    /// Start offsets of every full frame in a signal of `len` samples.
    pub fn frame_offsets(&self, len: usize) -> Vec<usize> {
        if len < self.settings.frame_size {
            return Vec::new();
        }
        (0..=len - self.settings.frame_size)
            .step_by(self.settings.hop_size)
            .collect()
    }

    /// Windowed magnitude spectrum of one frame.
    ///
    /// `frame` must hold exactly `frame_size` samples.
    pub fn spectrum(&self, frame: &[f64]) -> Result<Spectrum> {
        if frame.len() != self.settings.frame_size {
            return Err(Error::InvalidParameter {
                name: "frame length",
                value: frame.len() as f64,
            });
        }
        Ok(Spectrum::analyze(
            frame,
            &self.window,
            self.fft.as_ref(),
            self.sample_rate,
        ))
    }

    /// Amplitude estimate of each partial `f0 * k`, `k = 1..=partials`.
    pub fn partial_amplitudes(&self, spectrum: &Spectrum, f0: f64, partials: usize) -> Vec<f64> {
        (1..=partials)
            .map(|k| spectrum.partial_amplitude(f0 * k as f64, self.settings.bin_radius))
            .collect()
    }

    /// THD of one frame, in percent.
    ///
    /// Returns `Error::SilentFrame` if the fundamental carries no energy in
    /// this frame.
    pub fn frame_thd(&self, frame: &[f64], f0: f64, partials: usize) -> Result<f64> {
        check_partials(self.sample_rate, f0, partials)?;
        let spectrum = self.spectrum(frame)?;
        self.thd_from_spectrum(&spectrum, f0, partials)
            .ok_or(Error::SilentFrame)
    }

    /// Mean per-frame THD over the whole signal, in percent.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidParameter` / `Error::PartialsExceedNyquist` from
    ///   `check_partials`, raised before any spectral work
    /// - `Error::SignalTooShort` if the signal holds less than one frame
    /// - `Error::SilentFundamental` for the first frame with no energy at the
    ///   fundamental
    pub fn measure(&self, signal: &[f64], f0: f64, partials: usize) -> Result<f64> {
        check_partials(self.sample_rate, f0, partials)?;

        let offsets = self.frame_offsets(signal.len());
        if offsets.is_empty() {
            return Err(Error::SignalTooShort {
                len: signal.len(),
                required: self.settings.frame_size,
            });
        }
        log::debug!(
            "measuring THD of {} Hz x {} partials over {} frames",
            f0,
            partials,
            offsets.len()
        );

        let per_frame = self.analyze_frames(signal, &offsets, f0, partials);

        let mut total = 0.0;
        for (&offset, thd) in offsets.iter().zip(&per_frame) {
            match thd {
                Some(thd) => total += thd,
                None => return Err(Error::SilentFundamental { offset }),
            }
        }
        Ok(total / per_frame.len() as f64)
    }

    fn analyze_frame(
        &self,
        signal: &[f64],
        offset: usize,
        f0: f64,
        partials: usize,
    ) -> Option<f64> {
        let frame = &signal[offset..offset + self.settings.frame_size];
        let spectrum = Spectrum::analyze(frame, &self.window, self.fft.as_ref(), self.sample_rate);
        self.thd_from_spectrum(&spectrum, f0, partials)
    }

    #[cfg(not(feature = "parallel"))]
    fn analyze_frames(
        &self,
        signal: &[f64],
        offsets: &[usize],
        f0: f64,
        partials: usize,
    ) -> Vec<Option<f64>> {
        offsets
            .iter()
            .map(|&offset| self.analyze_frame(signal, offset, f0, partials))
            .collect()
    }

    // Results come back in frame order, so the sum matches the sequential path
    #[cfg(feature = "parallel")]
    fn analyze_frames(
        &self,
        signal: &[f64],
        offsets: &[usize],
        f0: f64,
        partials: usize,
    ) -> Vec<Option<f64>> {
        use rayon::prelude::*;

        offsets
            .par_iter()
            .map(|&offset| self.analyze_frame(signal, offset, f0, partials))
            .collect()
    }

    fn thd_from_spectrum(&self, spectrum: &Spectrum, f0: f64, partials: usize) -> Option<f64> {
        let amplitudes = self.partial_amplitudes(spectrum, f0, partials);
        let fundamental = amplitudes[0];
        if fundamental == 0.0 {
            return None;
        }
        let harmonics: f64 = amplitudes[1..].iter().map(|a| a * a).sum();
        Some(100.0 * (harmonics / (fundamental * fundamental)).sqrt())
    }
}

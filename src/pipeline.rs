//! Multichannel processing: amplify, limit and optionally score each channel.

use crate::analysis::{ThdAnalyzer, ThdSettings, check_partials};
use crate::dynamics::{LimiterSettings, limit};
use crate::error::{Error, Result};
use crate::level;
use crate::wav::AudioBuffer;

/// Harmonic series each channel is scored against.
pub struct ThdCheck {
    analyzer: ThdAnalyzer,
    f0: f64,
    partials: usize,
}

impl ThdCheck {
    /// Validates the partials against Nyquist and plans the analyzer.
    pub fn new(sample_rate: f64, f0: f64, partials: usize) -> Result<Self> {
        check_partials(sample_rate, f0, partials)?;
        Ok(Self {
            analyzer: ThdAnalyzer::new(sample_rate, ThdSettings::default())?,
            f0,
            partials,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.analyzer.sample_rate()
    }

    pub fn f0(&self) -> f64 {
        self.f0
    }

    pub fn partials(&self) -> usize {
        self.partials
    }

    fn measure(&self, signal: &[f64]) -> Result<f64> {
        self.analyzer.measure(signal, self.f0, self.partials)
    }
}

/// THD of a channel before and after limiting, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThdChange {
    pub before: f64,
    pub after: f64,
}

impl ThdChange {
    /// Distortion added by the limiter.
    pub fn increase(&self) -> f64 {
        self.after - self.before
    }
}

/// What limiting did to one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReport {
    /// Peak after amplification, before limiting
    pub peak_in: f64,
    /// Peak of the limited output
    pub peak_out: f64,
    /// Largest gain reduction, in dB
    pub gain_reduction_db: f64,
    pub thd: Option<ThdChange>,
}

/// Amplifies each channel by `amplify_db` and runs it through its own limiter.
///
/// With a `ThdCheck` the amplified input and the limited output of every
/// channel are both measured.
///
/// # Errors
///
/// - `Error::InvalidParameter` if the check was planned for a different
///   sample rate than the buffer's
/// - any error from `ThdAnalyzer::measure`
///
/// # Examples
///
/// ```
/// use safety_limiter::LimiterSettings;
/// use safety_limiter::pipeline::limit_buffer;
/// use safety_limiter::wav::AudioBuffer;
///
/// let input = AudioBuffer::new(48000, vec![vec![0.5, 2.0, 0.25], vec![0.1, 0.1, 0.1]]);
/// let (output, reports) = limit_buffer(&input, 0.0, LimiterSettings::default(), None).unwrap();
/// assert_eq!(output.channels[0], vec![0.5, 1.0, 0.125]);
/// assert_eq!(output.channels[1], input.channels[1]);
/// assert_eq!(reports[0].peak_in, 2.0);
/// ```
pub fn limit_buffer(
    input: &AudioBuffer,
    amplify_db: f64,
    settings: LimiterSettings,
    thd: Option<&ThdCheck>,
) -> Result<(AudioBuffer, Vec<ChannelReport>)> {
    let sample_rate = f64::from(input.sample_rate);
    if thd.is_some_and(|check| check.sample_rate() != sample_rate) {
        return Err(Error::InvalidParameter {
            name: "sample_rate",
            value: sample_rate,
        });
    }

    let mut channels = Vec::with_capacity(input.num_channels());
    let mut reports = Vec::with_capacity(input.num_channels());
    for channel in &input.channels {
        let amplified = level::amplify(channel, amplify_db);
        let limited = limit(&amplified, sample_rate, settings);

        let thd = match thd {
            Some(check) => Some(ThdChange {
                before: check.measure(&amplified)?,
                after: check.measure(&limited.out)?,
            }),
            None => None,
        };
        reports.push(ChannelReport {
            peak_in: level::peak(&amplified),
            peak_out: limited.peak(),
            gain_reduction_db: limited.peak_gain_reduction_db(),
            thd,
        });
        channels.push(limited.out);
    }

    Ok((AudioBuffer::new(input.sample_rate, channels), reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Signal, SineOscillator};

    fn stereo_tone(len: usize) -> AudioBuffer {
        let tone = SineOscillator::new(440.0, 48000.0).take_samples(len);
        let quiet: Vec<f64> = tone.iter().map(|x| x * 0.1).collect();
        AudioBuffer::new(48000, vec![tone, quiet])
    }

    #[test]
    fn test_channels_are_limited_independently() {
        let input = stereo_tone(4800);
        let settings = LimiterSettings::default();
        let (output, reports) = limit_buffer(&input, 12.0, settings, None).unwrap();

        assert_eq!(output.sample_rate, 48000);
        assert_eq!(output.num_channels(), 2);
        for (index, channel) in input.channels.iter().enumerate() {
            let expected = limit(&level::amplify(channel, 12.0), 48000.0, settings).out;
            assert_eq!(output.channels[index], expected);
        }

        // Only the loud channel is pushed past full scale
        assert!(reports[0].peak_in > 3.9);
        assert!(reports[0].gain_reduction_db > 11.0);
        assert!(reports[1].peak_in < 0.5);
        assert_eq!(reports[1].gain_reduction_db, 0.0);
        let quiet = level::amplify(&input.channels[1], 12.0);
        assert_eq!(output.channels[1], quiet);
        for report in &reports {
            assert!(report.peak_out <= 1.0 + 1e-12);
            assert!(report.thd.is_none());
        }
    }

    #[test]
    fn test_thd_is_measured_per_channel() {
        let input = stereo_tone(9600);
        let check = ThdCheck::new(48000.0, 440.0, 8).unwrap();
        let settings = LimiterSettings::default();
        let (_, reports) = limit_buffer(&input, 18.0, settings, Some(&check)).unwrap();

        for report in &reports {
            let thd = report.thd.unwrap();
            assert!(thd.before < 0.01);
            assert!(thd.increase() < 0.001, "THD increase {}", thd.increase());
        }
    }

    #[test]
    fn test_sample_rate_mismatch_is_rejected() {
        let check = ThdCheck::new(44100.0, 440.0, 8).unwrap();
        let input = stereo_tone(4800);
        let result = limit_buffer(&input, 0.0, LimiterSettings::default(), Some(&check));
        assert!(result.unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_check_rejects_partials_past_nyquist() {
        assert!(ThdCheck::new(48000.0, 440.0, 60).is_err());
        let check = ThdCheck::new(48000.0, 440.0, 8).unwrap();
        assert_eq!(check.sample_rate(), 48000.0);
        assert_eq!(check.f0(), 440.0);
        assert_eq!(check.partials(), 8);
    }
}

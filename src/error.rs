//! Error type shared by the analyzer and the file I/O helpers.
//!
//! The limiter itself never fails: degenerate samples and settings are
//! absorbed rather than reported.

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A numeric argument is outside its valid domain.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The highest requested partial sits at or above the Nyquist frequency.
    #[error("partials exceed Nyquist frequency: {f0} Hz x {partials} partials >= {nyquist} Hz")]
    PartialsExceedNyquist {
        f0: f64,
        partials: usize,
        nyquist: f64,
    },

    /// The signal does not contain a single full analysis frame.
    #[error("signal has {len} samples but one analysis frame needs {required}")]
    SignalTooShort { len: usize, required: usize },

    /// The fundamental carries no energy, so a distortion ratio is undefined.
    #[error("no energy at the fundamental in the frame starting at sample {offset}")]
    SilentFundamental { offset: usize },

    /// A single frame handed to `ThdAnalyzer::frame_thd` has no energy at the
    /// fundamental.
    #[error("no energy at the fundamental in the analyzed frame")]
    SilentFrame,

    /// An audio file decoded to zero samples.
    #[error("audio contains no samples")]
    EmptyAudio,

    /// Channels handed to the writer are not all the same length.
    #[error("channel {channel} has {len} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        len: usize,
        expected: usize,
    },

    #[cfg(feature = "wav")]
    #[error(transparent)]
    Wav(#[from] hound::Error),
}

impl Error {
    /// Returns true for errors caused by the caller's arguments rather than
    /// by the signal content.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            Error::InvalidParameter { .. } | Error::PartialsExceedNyquist { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

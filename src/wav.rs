//! WAV file reading and writing.
//!
//! Channels are handled de-interleaved, one `Vec<f64>` per channel, which is
//! the shape the limiter and analyzer consume.

use std::path::Path;

use crate::error::{Error, Result};

/// Decoded multi-channel audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// One sample vector per channel, all the same length
    pub channels: Vec<Vec<f64>>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f64>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Reads a WAV file.
///
/// Integer formats are scaled into [-1, 1) by `2^(bits - 1)`; float formats
/// are read as is. Sample rate conversion is not performed.
///
/// # Errors
///
/// Returns an error if the file cannot be decoded or holds no samples.
pub fn read<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1_i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_value))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if samples.is_empty() || spec.channels == 0 {
        return Err(Error::EmptyAudio);
    }

    let num_channels = spec.channels as usize;
    let mut channels = vec![Vec::with_capacity(samples.len() / num_channels); num_channels];
    for frame in samples.chunks(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    log::debug!(
        "read {} channels x {} frames at {} Hz",
        num_channels,
        channels[0].len(),
        spec.sample_rate
    );
    Ok(AudioBuffer::new(spec.sample_rate, channels))
}

/// Writes `buffer` as a 32-bit float WAV file with its own channel count.
///
/// # Errors
///
/// Returns an error if the buffer has no channels, its channels differ in
/// length, or the file cannot be written.
pub fn write<P: AsRef<Path>>(path: P, buffer: &AudioBuffer) -> Result<()> {
    if buffer.channels.is_empty() {
        return Err(Error::EmptyAudio);
    }
    let expected = buffer.frames();
    for (channel, samples) in buffer.channels.iter().enumerate() {
        if samples.len() != expected {
            return Err(Error::ChannelLengthMismatch {
                channel,
                len: samples.len(),
                expected,
            });
        }
    }
    let channels = u16::try_from(buffer.num_channels()).map_err(|_| Error::InvalidParameter {
        name: "channels",
        value: buffer.num_channels() as f64,
    })?;

    let spec = hound::WavSpec {
        channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for frame in 0..expected {
        for samples in &buffer.channels {
            writer.write_sample(samples[frame] as f32)?;
        }
    }
    writer.finalize()?;
    Ok(())
}

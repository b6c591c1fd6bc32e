//! Command-line safety limiter for WAV files.
//!
//! Each channel gets its own limiter. With `--thd` the distortion added by
//! the limiter is measured against the amplified input and logged.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use safety_limiter::dynamics::{DEFAULT_HOLD_TIME, DEFAULT_RELEASE_TIME, LimiterSettings};
use safety_limiter::pipeline::{ThdCheck, limit_buffer};
use safety_limiter::wav;

/// Limit a WAV file so that no sample exceeds full scale
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input audio file
    infile: PathBuf,

    /// Output WAV file (32-bit float)
    outfile: PathBuf,

    /// Gain applied before limiting, in dB
    #[arg(
        short = 'a',
        long,
        default_value_t = 0.0,
        allow_negative_numbers = true
    )]
    amplify: f64,

    /// Release time in seconds
    #[arg(long, default_value_t = DEFAULT_RELEASE_TIME)]
    release: f64,

    /// Hold time in seconds
    #[arg(long, default_value_t = DEFAULT_HOLD_TIME)]
    hold: f64,

    /// Fundamental frequency in Hz; logs THD before and after limiting
    #[arg(long)]
    thd: Option<f64>,

    /// Number of harmonic partials to include in the THD measurement
    #[arg(long, default_value_t = 8)]
    partials: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let input = wav::read(&args.infile)
        .with_context(|| format!("failed to read {}", args.infile.display()))?;
    let sample_rate = f64::from(input.sample_rate);
    log::info!(
        "{}: {} channels, {} frames at {} Hz",
        args.infile.display(),
        input.num_channels(),
        input.frames(),
        input.sample_rate
    );

    let check = match args.thd {
        Some(f0) => Some(ThdCheck::new(sample_rate, f0, args.partials)?),
        None => None,
    };

    let settings = LimiterSettings::new(args.release, args.hold);
    let (output, reports) = limit_buffer(&input, args.amplify, settings, check.as_ref())
        .with_context(|| format!("failed to process {}", args.infile.display()))?;

    for (index, report) in reports.iter().enumerate() {
        log::info!(
            "channel {}: peak {:.3} -> {:.3}, max gain reduction {:.2} dB",
            index,
            report.peak_in,
            report.peak_out,
            report.gain_reduction_db
        );
        if let Some(thd) = report.thd {
            log::info!(
                "channel {}: THD {:.5}% -> {:.5}% ({:+.5}%)",
                index,
                thd.before,
                thd.after,
                thd.increase()
            );
        }
    }

    wav::write(&args.outfile, &output)
        .with_context(|| format!("failed to write {}", args.outfile.display()))?;
    log::info!("wrote {}", args.outfile.display());
    Ok(())
}

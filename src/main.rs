use anyhow::Context;
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use butterstream::comparison::{FilterComparison, compare_outputs};
use butterstream::config::{ConfigOverrides, FilterKind, Frequency, HarnessConfig, InitMode, ToneConfig};
use butterstream::output::{ComparisonSummary, OutputFormat, create_formatter, iso8601_timestamp};
use butterstream::save_wav;
use butterstream::source::{LiteralSource, SampleSource, ToneSource, WavFileSource};

#[derive(Parser, Debug)]
#[command(name = "butterstream")]
#[command(
    about = "Filter a signal with a Butterworth low-pass in batch and streaming modes and compare",
    long_about = None
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sampling frequency (e.g. "500", "48khz"); ignored for WAV input
    #[arg(long)]
    sample_rate: Option<Frequency>,

    /// Cutoff frequency (e.g. "10hz")
    #[arg(long)]
    cutoff: Option<Frequency>,

    /// Filter order
    #[arg(long)]
    order: Option<usize>,

    /// Filter kind (only low-pass is supported)
    #[arg(long)]
    kind: Option<FilterKind>,

    /// Literal input samples, comma or space separated (e.g. "1,0,0,0,0")
    #[arg(long, conflicts_with = "wav")]
    input: Option<String>,

    /// Read input from a WAV file
    #[arg(long)]
    wav: Option<PathBuf>,

    /// WAV channel to filter (0-based)
    #[arg(long, default_value_t = 0)]
    channel: usize,

    /// Tone for the generated signal, "<freq>[:<amplitude>]"; repeatable
    #[arg(long = "tone")]
    tones: Vec<ToneConfig>,

    /// Duration of the generated signal in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Initial filter state: rest, steady
    #[arg(long, value_enum)]
    init: Option<InitMode>,

    /// Samples per chunk handed to the streaming filter
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Relative tolerance for batch/stream agreement
    #[arg(long)]
    tolerance: Option<f64>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print only the summary line
    #[arg(long)]
    summary_only: bool,

    /// Write input, batch and stream sequences to a 3-channel WAV file
    #[arg(long)]
    dump_wav: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = HarnessConfig::resolve(args.config.as_deref(), &args.overrides())?;

    let sample_rate_hz = match &args.wav {
        Some(path) => WavFileSource::header_sample_rate(path)?,
        None => config.signal.sample_rate.as_hz(),
    };

    let spec = config.filter_spec(sample_rate_hz);
    let comparison = FilterComparison::new(spec, config.stream.init)
        .context("designing filter")?;

    let chunk_size = config.stream.chunk_size;
    let run = comparison.run(|| -> anyhow::Result<Box<dyn SampleSource>> {
        if let Some(list) = &args.input {
            Ok(Box::new(LiteralSource::parse(list, sample_rate_hz, chunk_size)?))
        } else if let Some(path) = &args.wav {
            Ok(Box::new(WavFileSource::new(path, args.channel, chunk_size)?))
        } else {
            Ok(Box::new(ToneSource::new(
                &config.signal.tones,
                sample_rate_hz,
                config.signal.duration_secs,
                chunk_size,
            )))
        }
    })?;

    let tolerance = config.stream.tolerance;
    let stats = compare_outputs(&run.batch, &run.stream.outputs, tolerance);
    let reference_stats = run
        .reference
        .as_ref()
        .map(|reference| compare_outputs(&run.batch, reference, tolerance));

    let summary = ComparisonSummary {
        generated_at: iso8601_timestamp(),
        samples: stats.count,
        order: spec.order,
        cutoff_hz: spec.cutoff_hz,
        sample_rate_hz,
        init: config.stream.init.to_string(),
        max_abs_difference: stats.max_abs,
        mean_abs_difference: stats.mean_abs,
        max_rel_difference: stats.max_rel,
        max_reference_difference: reference_stats.as_ref().map(|s| s.max_abs),
        tolerance,
        passed: stats.within_tolerance,
    };

    let formatter = create_formatter(args.format);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if !args.summary_only {
        if let Some(header) = formatter.header() {
            writeln!(out, "{}", header)?;
        }
        for row in run.rows() {
            writeln!(out, "{}", formatter.format_row(&row))?;
        }
    }
    writeln!(out, "{}", formatter.format_summary(&summary))?;
    out.flush()?;

    if let Some(path) = &args.dump_wav {
        save_wav(
            path,
            &[run.input.clone(), run.batch.clone(), run.stream.outputs.clone()],
            sample_rate_hz.round() as u32,
        )
        .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote {}", path.display());
    }

    if let Some(reference) = &reference_stats {
        if !reference.within_tolerance {
            log::warn!(
                "Transfer-function output differs from SOS reference by up to {:.3e}",
                reference.max_abs
            );
        }
    }

    stats.ensure_within_tolerance(tolerance)?;

    Ok(())
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            sample_rate: self.sample_rate,
            cutoff: self.cutoff,
            order: self.order,
            kind: self.kind,
            tones: self.tones.clone(),
            duration_secs: self.duration,
            init: self.init,
            chunk_size: self.chunk_size,
            tolerance: self.tolerance,
        }
    }
}

use std::thread;

use crossbeam_channel::bounded;
use rolling_stats::Stats;

use crate::error::Result;
use crate::output::ComparisonRow;
use crate::signal_processing::{
    Filter, FilterCoefficients, FilterSpec, FilterState, InitMode, SosLowpass, engine,
    process_batch,
};
use crate::source::{SampleSource, read_all};

/// Chunks buffered between the sample producer and the filter thread
const CHANNEL_DEPTH: usize = 16;

/// Output of one streaming session
pub struct StreamRun {
    /// Samples in the order they arrived
    pub inputs: Vec<f64>,
    pub outputs: Vec<f64>,
    /// State after the last sample
    pub final_state: FilterState,
}

/// Everything produced by comparing batch and streaming filtering
pub struct ComparisonRun {
    pub sample_rate_hz: f64,
    pub input: Vec<f64>,
    pub batch: Vec<f64>,
    pub stream: StreamRun,
    /// SOS cascade output, only computed when starting at rest
    pub reference: Option<Vec<f64>>,
}

/// Aggregate element-wise differences between two output sequences
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceStats {
    pub count: usize,
    pub max_abs: f64,
    pub mean_abs: f64,
    pub max_rel: f64,
    pub within_tolerance: bool,
}

/// Designs a filter once and runs it in batch and streaming modes
pub struct FilterComparison {
    spec: FilterSpec,
    coefficients: FilterCoefficients,
    init: InitMode,
}

impl FilterComparison {
    pub fn new(spec: FilterSpec, init: InitMode) -> Result<Self> {
        let coefficients = spec.design()?;
        log::info!(
            "Designed order {} {} at {} Hz (fs {} Hz), DC gain {:.12}",
            spec.order,
            spec.kind,
            spec.cutoff_hz,
            spec.sample_rate_hz,
            coefficients.dc_gain()
        );
        Ok(Self {
            spec,
            coefficients,
            init,
        })
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coefficients
    }

    pub fn init(&self) -> InitMode {
        self.init
    }

    /// Initial state for a stream whose first sample is `first_sample`
    pub fn initial_state(&self, first_sample: Option<f64>) -> Result<FilterState> {
        match (self.init, first_sample) {
            (InitMode::Steady, Some(v)) => engine::init_steady_state(&self.coefficients, v),
            _ => Ok(engine::init_state(&self.coefficients)),
        }
    }

    /// Filter the whole input in one call
    pub fn run_batch(&self, input: &[f64]) -> Result<Vec<f64>> {
        let initial = self.initial_state(input.first().copied())?;
        process_batch(&self.coefficients, &initial, input)
    }

    /// Filter a source one sample at a time, threading the state by hand
    ///
    /// The source is drained on a producer thread and handed over in
    /// chunks through a bounded channel; this thread owns the state.
    pub fn run_streaming(&self, mut source: Box<dyn SampleSource>) -> anyhow::Result<StreamRun> {
        let (tx, rx) = bounded::<Vec<f64>>(CHANNEL_DEPTH);

        let producer = thread::spawn(move || -> anyhow::Result<()> {
            while let Some(chunk) = source.next_buffer()? {
                if tx.send(chunk).is_err() {
                    log::warn!("Stream consumer dropped");
                    break;
                }
            }
            Ok(())
        });

        let mut state: Option<FilterState> = None;
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();

        for chunk in rx.iter() {
            for sample in chunk {
                let current = match state.take() {
                    Some(s) => s,
                    None => self.initial_state(Some(sample))?,
                };
                let (output, next) = engine::process_one(&self.coefficients, &current, sample)?;
                state = Some(next);
                inputs.push(sample);
                outputs.push(output);
            }
        }

        producer
            .join()
            .map_err(|_| anyhow::anyhow!("sample producer thread panicked"))??;

        log::debug!("Streamed {} samples", outputs.len());

        Ok(StreamRun {
            inputs,
            outputs,
            final_state: state.unwrap_or_else(|| engine::init_state(&self.coefficients)),
        })
    }

    /// Run both modes over the same signal
    ///
    /// `open_source` is called twice: once for the batch read, once for the
    /// streaming session.
    pub fn run<F>(&self, open_source: F) -> anyhow::Result<ComparisonRun>
    where
        F: Fn() -> anyhow::Result<Box<dyn SampleSource>>,
    {
        let mut batch_source = open_source()?;
        let sample_rate_hz = batch_source.sample_rate();
        let input = read_all(&mut batch_source)?;
        let batch = self.run_batch(&input)?;

        let stream = self.run_streaming(open_source()?)?;
        let same_samples = stream.inputs.len() == input.len()
            && stream
                .inputs
                .iter()
                .zip(input.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits());
        if !same_samples {
            anyhow::bail!(
                "Source delivered different samples on the second read ({} vs {})",
                stream.inputs.len(),
                input.len()
            );
        }

        let reference = match self.init {
            InitMode::Rest => {
                let mut sos = SosLowpass::from_spec(&self.spec)?;
                Some(input.iter().map(|&x| sos.process(x)).collect())
            }
            InitMode::Steady => None,
        };

        Ok(ComparisonRun {
            sample_rate_hz,
            input,
            batch,
            stream,
            reference,
        })
    }
}

impl ComparisonRun {
    pub fn rows(&self) -> impl Iterator<Item = ComparisonRow> + '_ {
        (0..self.input.len()).map(move |i| {
            let batch = self.batch[i];
            let stream = self.stream.outputs[i];
            ComparisonRow {
                index: i,
                time_s: i as f64 / self.sample_rate_hz,
                input: self.input[i],
                batch,
                stream,
                difference: stream - batch,
                reference: self.reference.as_ref().map(|r| r[i]),
            }
        })
    }
}

impl DifferenceStats {
    /// Fail unless every element agreed to `tolerance`
    pub fn ensure_within_tolerance(&self, tolerance: f64) -> anyhow::Result<()> {
        if !self.within_tolerance {
            anyhow::bail!(
                "Streaming output diverged from batch output over {} samples (max |diff| {:.3e}, tolerance {:.1e})",
                self.count,
                self.max_abs,
                tolerance
            );
        }
        Ok(())
    }
}

/// `true` when `a` and `b` agree to `tolerance`, relative to their
/// magnitude with an absolute floor of 1
pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

/// Element-wise comparison of two sequences
///
/// Sequences of different length never pass.
pub fn compare_outputs(expected: &[f64], actual: &[f64], tolerance: f64) -> DifferenceStats {
    let mut abs_stats: Stats<f64> = Stats::new();
    let mut max_rel: f64 = 0.0;
    let mut all_within = expected.len() == actual.len();

    for (&e, &a) in expected.iter().zip(actual.iter()) {
        if !within_tolerance(e, a, tolerance) {
            all_within = false;
        }
        if e.is_nan() && a.is_nan() {
            abs_stats.update(0.0);
            continue;
        }
        let diff = (a - e).abs();
        abs_stats.update(diff);
        max_rel = max_rel.max(diff / e.abs().max(1.0));
    }

    let count = expected.len().min(actual.len());
    DifferenceStats {
        count,
        max_abs: if count == 0 { 0.0 } else { abs_stats.max },
        mean_abs: if count == 0 { 0.0 } else { abs_stats.mean },
        max_rel,
        within_tolerance: all_within,
    }
}

use std::f64::consts::PI;

use super::{ChunkCursor, SampleSource};
use crate::config::ToneConfig;

/// Sum of sinusoids sampled at `sample_rate` for `duration_secs`
///
/// Sample `n` is taken at `t = n / sample_rate`; the end point is excluded.
pub fn synthesize_tones(tones: &[ToneConfig], sample_rate: f64, duration_secs: f64) -> Vec<f64> {
    let num_samples = (duration_secs * sample_rate).round() as usize;

    (0..num_samples)
        .map(|n| {
            let t = n as f64 / sample_rate;
            tones
                .iter()
                .map(|tone| tone.amplitude * (2.0 * PI * tone.freq.as_hz() * t).sin())
                .sum()
        })
        .collect()
}

/// Generated multi-tone test signal
pub struct ToneSource {
    cursor: ChunkCursor,
    sample_rate: f64,
}

impl ToneSource {
    pub fn new(
        tones: &[ToneConfig],
        sample_rate: f64,
        duration_secs: f64,
        chunk_size: usize,
    ) -> Self {
        let samples = synthesize_tones(tones, sample_rate, duration_secs);
        log::debug!(
            "Synthesized {} samples from {} tone(s) at {} Hz",
            samples.len(),
            tones.len(),
            sample_rate
        );
        Self {
            cursor: ChunkCursor::new(samples, chunk_size),
            sample_rate,
        }
    }
}

impl SampleSource for ToneSource {
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<f64>>> {
        Ok(self.cursor.next_chunk())
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Frequency, SignalConfig};
    use crate::source::read_all;

    #[test]
    fn test_synthesize_length() {
        let config = SignalConfig::default();
        let signal = synthesize_tones(&config.tones, 500.0, 1.0);
        assert_eq!(signal.len(), 500);
        assert_eq!(signal[0], 0.0);
    }

    #[test]
    fn test_single_tone_values() {
        let tone = ToneConfig {
            freq: Frequency::from_hz(125.0),
            amplitude: 2.0,
        };
        // Quarter period per sample at 500 Hz
        let signal = synthesize_tones(&[tone], 500.0, 0.008);
        assert_eq!(signal.len(), 4);
        assert!((signal[1] - 2.0).abs() < 1e-12);
        assert!(signal[2].abs() < 1e-12);
        assert!((signal[3] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_source_chunks_cover_signal() {
        let config = SignalConfig::default();
        let mut source = ToneSource::new(&config.tones, 500.0, 1.0, 64);
        let first = source.next_buffer().unwrap().unwrap();
        assert_eq!(first.len(), 64);
        let rest = read_all(&mut source).unwrap();
        assert_eq!(first.len() + rest.len(), 500);
    }
}

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use hound::WavReader;

use super::{ChunkCursor, SampleSource};

/// One channel of a WAV file
pub struct WavFileSource {
    cursor: ChunkCursor,
    sample_rate: f64,
}

impl WavFileSource {
    /// Open `path` and extract `channel` (0-based)
    pub fn new<P: AsRef<Path>>(path: P, channel: usize, chunk_size: usize) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader =
            WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();

        let channels = spec.channels as usize;
        if channel >= channels {
            anyhow::bail!(
                "Channel {} requested but {} has {} channel(s)",
                channel,
                path.display(),
                channels
            );
        }

        let interleaved = Self::read_samples(reader, &spec)?;
        let samples: Vec<f64> = interleaved
            .into_iter()
            .skip(channel)
            .step_by(channels)
            .collect();

        log::info!(
            "Read {} samples from channel {} of {} ({} Hz)",
            samples.len(),
            channel,
            path.display(),
            spec.sample_rate
        );

        Ok(Self {
            cursor: ChunkCursor::new(samples, chunk_size),
            sample_rate: spec.sample_rate as f64,
        })
    }

    /// Sample rate from the header alone, without decoding any samples
    pub fn header_sample_rate<P: AsRef<Path>>(path: P) -> anyhow::Result<f64> {
        let path = path.as_ref();
        let reader =
            WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(reader.spec().sample_rate as f64)
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> anyhow::Result<Vec<f64>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max_val = 2_i64.pow(spec.bits_per_sample as u32 - 1) as f64;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f64 / max_val))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }
}

impl SampleSource for WavFileSource {
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
    use crate::source::read_all;
    use crate::wav::save_wav;

    #[test]
    fn test_wav_round_trip_selects_channel() {
        let path = std::env::temp_dir().join(format!(
            "butterstream_wav_source_{}.wav",
            std::process::id()
        ));
        let left = vec![0.5, -0.25, 0.125];
        let right = vec![1.0, 0.0, -1.0];
        save_wav(&path, &[left.clone(), right.clone()], 8000).unwrap();

        let mut source = WavFileSource::new(&path, 1, 2).unwrap();
        assert_eq!(source.sample_rate(), 8000.0);
        assert_eq!(read_all(&mut source).unwrap(), right);

        assert!(WavFileSource::new(&path, 2, 2).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_header_sample_rate() {
        let path = std::env::temp_dir().join(format!(
            "butterstream_wav_header_{}.wav",
            std::process::id()
        ));
        save_wav(&path, &[vec![0.0; 16]], 22050).unwrap();
        assert_eq!(WavFileSource::header_sample_rate(&path).unwrap(), 22050.0);
        let _ = std::fs::remove_file(&path);

        assert!(WavFileSource::header_sample_rate(&path).is_err());
    }
}

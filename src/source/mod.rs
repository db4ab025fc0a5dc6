//! Sample sources feeding the filter core.
//!
//! A source hands out its samples in order, one chunk at a time. The batch
//! path drains it completely with [`read_all`]; the streaming path pulls
//! chunks as they are needed.

mod literal;
mod tone;
mod wav;

pub use literal::LiteralSource;
pub use tone::{ToneSource, synthesize_tones};
pub use wav::WavFileSource;

pub trait SampleSource: Send {
    /// Next chunk in time order, or `None` once exhausted
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<f64>>>;

    /// Sampling frequency in Hz
    fn sample_rate(&self) -> f64;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<f64>>> {
        (**self).next_buffer()
    }

    fn sample_rate(&self) -> f64 {
        (**self).sample_rate()
    }
}

/// Drain a source into one contiguous buffer
pub fn read_all<S: SampleSource + ?Sized>(source: &mut S) -> anyhow::Result<Vec<f64>> {
    let mut samples = Vec::new();
    while let Some(chunk) = source.next_buffer()? {
        samples.extend_from_slice(&chunk);
    }
    Ok(samples)
}

/// Chunked cursor over an in-memory sample buffer
///
/// Shared by every source that materialises its samples up front.
#[derive(Debug, Clone)]
pub(crate) struct ChunkCursor {
    samples: Vec<f64>,
    position: usize,
    chunk_size: usize,
}

impl ChunkCursor {
    pub(crate) fn new(samples: Vec<f64>, chunk_size: usize) -> Self {
        Self {
            samples,
            position: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    pub(crate) fn next_chunk(&mut self) -> Option<Vec<f64>> {
        if self.position >= self.samples.len() {
            return None;
        }

        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Some(chunk)
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_chunks_in_order() {
        let mut cursor = ChunkCursor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], 2);
        assert_eq!(cursor.next_chunk(), Some(vec![1.0, 2.0]));
        assert_eq!(cursor.next_chunk(), Some(vec![3.0, 4.0]));
        assert_eq!(cursor.next_chunk(), Some(vec![5.0]));
        assert_eq!(cursor.next_chunk(), None);
    }

    #[test]
    fn test_cursor_zero_chunk_size_is_one() {
        let mut cursor = ChunkCursor::new(vec![1.0, 2.0], 0);
        assert_eq!(cursor.next_chunk(), Some(vec![1.0]));
    }

    #[test]
    fn test_read_all_boxed() {
        let mut source: Box<dyn SampleSource> =
            Box::new(LiteralSource::new(vec![1.0, 0.0, 0.5], 500.0, 2));
        assert_eq!(read_all(&mut source).unwrap(), vec![1.0, 0.0, 0.5]);
        assert_eq!(source.sample_rate(), 500.0);
    }
}

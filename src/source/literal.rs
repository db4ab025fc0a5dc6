use super::{ChunkCursor, SampleSource};

/// Samples given explicitly, e.g. on the command line
pub struct LiteralSource {
    cursor: ChunkCursor,
    sample_rate: f64,
}

impl LiteralSource {
    pub fn new(samples: Vec<f64>, sample_rate: f64, chunk_size: usize) -> Self {
        Self {
            cursor: ChunkCursor::new(samples, chunk_size),
            sample_rate,
        }
    }

    /// Parse a comma- and/or whitespace-separated list such as `"1, 0, 0"`
    pub fn parse(list: &str, sample_rate: f64, chunk_size: usize) -> anyhow::Result<Self> {
        let samples = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| anyhow::anyhow!("invalid sample value: {:?}", token))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self::new(samples, sample_rate, chunk_size))
    }

    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.len() == 0
    }
}

impl SampleSource for LiteralSource {
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

    #[test]
    fn test_parse_mixed_separators() {
        let mut source = LiteralSource::parse("1, 0 0,\n-2.5e-1", 500.0, 3).unwrap();
        assert_eq!(source.len(), 4);
        assert_eq!(read_all(&mut source).unwrap(), vec![1.0, 0.0, 0.0, -0.25]);
    }

    #[test]
    fn test_parse_empty() {
        let source = LiteralSource::parse("  ", 500.0, 1).unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(LiteralSource::parse("1, two, 3", 500.0, 1).is_err());
    }
}

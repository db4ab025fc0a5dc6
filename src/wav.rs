use std::path::Path;

use hound::{WavSpec, WavWriter};

/// Write sequences as the channels of a 32-bit float WAV file
///
/// Shorter channels are padded with silence to the longest length.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    channels: &[Vec<f64>],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: channels.len().max(1) as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;

    let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
    for i in 0..frames {
        for channel in channels {
            let sample = channel.get(i).copied().unwrap_or(0.0);
            writer.write_sample(sample as f32)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

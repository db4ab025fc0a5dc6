use rayon::prelude::*;

use super::coefficients::FilterCoefficients;
use super::filter::Filter;
use super::streaming::{InitMode, StreamingFilter};
use crate::error::Result;

/// Filter independent channels in parallel with shared coefficients
///
/// Channels are spread over the rayon pool, each with its own state;
/// nothing is exchanged between channels. In `InitMode::Steady` every
/// channel is primed from its own first sample. Output channel order
/// matches input.
pub fn filter_channels(
    coefficients: &FilterCoefficients,
    channels: &[Vec<f64>],
    init: InitMode,
) -> Result<Vec<Vec<f64>>> {
    log::debug!(
        "Filtering {} channel(s) with order {} coefficients",
        channels.len(),
        coefficients.order()
    );

    channels
        .par_iter()
        .map(|channel| filter_channel(coefficients, channel, init))
        .collect()
}

fn filter_channel(
    coefficients: &FilterCoefficients,
    samples: &[f64],
    init: InitMode,
) -> Result<Vec<f64>> {
    let mut filter = StreamingFilter::for_mode(coefficients, init, samples.first().copied())?;
    let mut output = samples.to_vec();
    filter.process_buffer(&mut output);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_processing::butterworth::FilterSpec;
    use crate::signal_processing::engine;

    #[test]
    fn test_channels_match_sequential() {
        let c = FilterSpec::lowpass(10.0, 500.0, 3).design().unwrap();
        let channels: Vec<Vec<f64>> = (0..4)
            .map(|ch| {
                (0..300)
                    .map(|i| ((i + ch * 17) as f64 * 0.1).sin() + ch as f64)
                    .collect()
            })
            .collect();

        let parallel = filter_channels(&c, &channels, InitMode::Steady).unwrap();
        assert_eq!(parallel.len(), channels.len());

        for (input, output) in channels.iter().zip(parallel.iter()) {
            let s0 = engine::init_steady_state(&c, input[0]).unwrap();
            let expected = engine::process_batch(&c, &s0, input).unwrap();
            assert_eq!(output, &expected);
        }
    }

    #[test]
    fn test_empty_inputs() {
        let c = FilterSpec::lowpass(10.0, 500.0, 2).design().unwrap();
        assert!(filter_channels(&c, &[], InitMode::Rest).unwrap().is_empty());

        let out = filter_channels(&c, &[Vec::new()], InitMode::Steady).unwrap();
        assert_eq!(out, vec![Vec::<f64>::new()]);
    }

    #[test]
    fn test_many_channels_keep_order() {
        let c = FilterSpec::lowpass(10.0, 500.0, 2).design().unwrap();
        let channels: Vec<Vec<f64>> = (0..2000).map(|ch| vec![ch as f64; 8]).collect();

        let out = filter_channels(&c, &channels, InitMode::Steady).unwrap();
        assert_eq!(out.len(), 2000);
        for (ch, output) in out.iter().enumerate() {
            let expected = ch as f64 * c.dc_gain();
            assert!(output.iter().all(|y| (y - expected).abs() <= 1e-9 * expected.max(1.0)));
        }
    }

    #[test]
    fn test_first_error_is_returned() {
        let integrator = FilterCoefficients::new(vec![1.0, 0.0], vec![1.0, -1.0]).unwrap();
        let result = filter_channels(&integrator, &[vec![1.0], vec![2.0]], InitMode::Steady);
        assert_eq!(result, Err(crate::error::FilterError::NoSteadyState));
    }
}

use iir_filters::filter::{DirectForm2Transposed, Filter as IirFilter};
use iir_filters::filter_design::{FilterType, butter};
use iir_filters::sos::zpk2sos;

use super::butterworth::FilterSpec;
use super::filter::Filter;
use crate::error::{FilterError, Result};

/// Butterworth low-pass realised as cascaded second-order sections
///
/// Designed by `iir_filters` independently of the transfer-function
/// designer, so its output serves as a cross-check. Biquads keep better
/// precision at high orders than the expanded polynomial form. Always
/// starts from rest.
pub struct SosLowpass {
    filter: DirectForm2Transposed,
}

impl SosLowpass {
    /// # Errors
    /// Returns `FilterError::InvalidSpec` for parameters the designer
    /// would reject, or `FilterError::FilterDesign` if `iir_filters` fails.
    pub fn new(cutoff_hz: f64, sample_rate_hz: f64, order: usize) -> Result<Self> {
        FilterSpec::lowpass(cutoff_hz, sample_rate_hz, order).validate()?;

        let zpk = butter(order as u32, FilterType::LowPass(cutoff_hz), sample_rate_hz)
            .map_err(|e| FilterError::FilterDesign(format!("{:?}", e)))?;

        let sos = zpk2sos(&zpk, None).map_err(|e| FilterError::FilterDesign(format!("{:?}", e)))?;

        Ok(Self {
            filter: DirectForm2Transposed::new(&sos),
        })
    }

    pub fn from_spec(spec: &FilterSpec) -> Result<Self> {
        Self::new(spec.cutoff_hz, spec.sample_rate_hz, spec.order)
    }
}

impl Filter for SosLowpass {
    fn process(&mut self, sample: f64) -> f64 {
        self.filter.filter(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sos_lowpass_design() {
        assert!(SosLowpass::new(10.0, 500.0, 6).is_ok());
    }

    #[test]
    fn test_sos_rejects_above_nyquist() {
        assert!(matches!(
            SosLowpass::new(300.0, 500.0, 2),
            Err(FilterError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_sos_lowpass_attenuates_stopband() {
        let mut filter = SosLowpass::new(10.0, 500.0, 4).unwrap();

        // 50 Hz tone, 5x the cutoff
        let input: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 50.0 * i as f64 / 500.0).sin())
            .collect();

        let mut output = input.clone();
        filter.process_buffer(&mut output);

        let rms = |s: &[f64]| (s.iter().map(|x| x * x).sum::<f64>() / s.len() as f64).sqrt();
        let attenuation_db = 20.0 * (rms(&output[500..]) / rms(&input[500..])).log10();
        assert!(
            attenuation_db < -40.0,
            "Stopband not attenuated enough: {} dB",
            attenuation_db
        );
    }
}

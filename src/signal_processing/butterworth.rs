use num_complex::Complex64;
use serde::Deserialize;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use super::coefficients::FilterCoefficients;
use crate::constants::TF_PRECISION_WARN_ORDER;
use crate::error::{FilterError, Result};

/// Sample rate used for the bilinear mapping of the normalised design.
/// Cutoffs are expressed as a fraction of Nyquist, so Nyquist is 1 here.
const NORMALIZED_FS: f64 = 2.0;

/// Filter response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FilterKind {
    /// Maximally flat low-pass
    LowPass,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowPass => write!(f, "lowpass"),
        }
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "lowpass" | "low-pass" | "lp" => Ok(Self::LowPass),
            other => Err(FilterError::Unsupported(other.to_string())),
        }
    }
}

impl TryFrom<String> for FilterKind {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Parameters of a Butterworth design
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub cutoff_hz: f64,
    pub sample_rate_hz: f64,
    pub order: usize,
    pub kind: FilterKind,
}

impl FilterSpec {
    pub fn lowpass(cutoff_hz: f64, sample_rate_hz: f64, order: usize) -> Self {
        Self {
            cutoff_hz,
            sample_rate_hz,
            order,
            kind: FilterKind::LowPass,
        }
    }

    /// Check the parameters without designing anything
    ///
    /// # Errors
    /// Returns `FilterError::InvalidSpec` if the cutoff or sample rate is
    /// not a positive finite number, the cutoff is at or above Nyquist, or
    /// the order is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(FilterError::InvalidSpec(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !self.cutoff_hz.is_finite() || self.cutoff_hz <= 0.0 {
            return Err(FilterError::InvalidSpec(format!(
                "cutoff must be positive, got {}",
                self.cutoff_hz
            )));
        }
        let nyquist = self.sample_rate_hz / 2.0;
        if self.cutoff_hz >= nyquist {
            return Err(FilterError::InvalidSpec(format!(
                "cutoff {} Hz must be below Nyquist ({} Hz)",
                self.cutoff_hz, nyquist
            )));
        }
        if self.order == 0 {
            return Err(FilterError::InvalidSpec(
                "order must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Cutoff as a fraction of Nyquist, in (0, 1)
    pub fn normalized_cutoff(&self) -> f64 {
        self.cutoff_hz / (self.sample_rate_hz / 2.0)
    }

    pub fn design(&self) -> Result<FilterCoefficients> {
        design(self.cutoff_hz, self.sample_rate_hz, self.order, self.kind)
    }
}

/// Design a digital Butterworth filter in transfer-function form
///
/// The analog prototype is pre-warped to the normalised cutoff, scaled,
/// and mapped to the z-plane with the bilinear transform. The result is
/// the expanded numerator/denominator with `a[0] == 1`.
///
/// # Arguments
/// * `cutoff_hz` - -3 dB frequency in Hz
/// * `sample_rate_hz` - Sampling frequency in Hz
/// * `order` - Number of poles
/// * `kind` - Response type; names other than low-pass are rejected with
///   `FilterError::Unsupported` when `FilterKind` is parsed
///
/// The expanded polynomials lose precision quickly as the order grows.
/// Above order 8 a warning is logged with the resulting DC gain. For a
/// cutoff of 0.04 x Nyquist the DC gain is already off by 0.3% at order
/// 12 and collapses to about 0.01 at order 16; use
/// [`SosLowpass`](super::SosLowpass) for orders like these.
///
/// # Errors
/// Returns `FilterError::InvalidSpec` for out-of-range parameters.
pub fn design(
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
    kind: FilterKind,
) -> Result<FilterCoefficients> {
    let spec = FilterSpec {
        cutoff_hz,
        sample_rate_hz,
        order,
        kind,
    };
    spec.validate()?;

    let wn = spec.normalized_cutoff();
    let warped = 2.0 * NORMALIZED_FS * (PI * wn / NORMALIZED_FS).tan();

    // Analog prototype, frequency-scaled to the warped cutoff
    let analog_poles: Vec<Complex64> = prototype_poles(order)
        .into_iter()
        .map(|p| p * warped)
        .collect();
    let analog_gain = warped.powi(order as i32);

    let (zeros, poles, gain) = bilinear_zpk(&analog_poles, analog_gain, NORMALIZED_FS);

    let feedforward: Vec<f64> = expand_roots(&zeros)
        .into_iter()
        .map(|c| gain * c.re)
        .collect();
    let feedback: Vec<f64> = expand_roots(&poles).into_iter().map(|c| c.re).collect();

    log::debug!(
        "Butterworth order {} at {:.4} x Nyquist: b={:?} a={:?}",
        order,
        wn,
        feedforward,
        feedback
    );

    let coefficients = FilterCoefficients::new(feedforward, feedback)?;
    if order > TF_PRECISION_WARN_ORDER {
        log::warn!(
            "Order {} Butterworth in transfer-function form loses precision \
             (DC gain {:.6e}, ideally 1); use SosLowpass for high orders",
            order,
            coefficients.dc_gain()
        );
    }
    Ok(coefficients)
}

/// Like [`design`], with the kind given by name (e.g. `"lowpass"`)
pub fn design_by_name(
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
    kind: &str,
) -> Result<FilterCoefficients> {
    design(cutoff_hz, sample_rate_hz, order, kind.parse()?)
}

/// Poles of the normalised analog Butterworth prototype (cutoff 1 rad/s)
///
/// `p_m = -exp(j pi m / 2N)` for `m = -N+1, -N+3, ..., N-1`; all lie on the
/// unit circle in the left half-plane.
fn prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as i64;
    (0..n)
        .map(|i| {
            let m = (-n + 1 + 2 * i) as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n as f64))
        })
        .collect()
}

/// Bilinear transform of an all-pole analog filter
///
/// Returns digital zeros, poles and gain. Every analog zero at infinity
/// maps to z = -1.
fn bilinear_zpk(
    analog_poles: &[Complex64],
    analog_gain: f64,
    fs: f64,
) -> (Vec<Complex64>, Vec<Complex64>, f64) {
    let fs2 = Complex64::new(2.0 * fs, 0.0);

    let poles: Vec<Complex64> = analog_poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
    let zeros = vec![Complex64::new(-1.0, 0.0); analog_poles.len()];

    let denom: Complex64 = analog_poles.iter().map(|&p| fs2 - p).product();
    let gain = analog_gain * (Complex64::new(1.0, 0.0) / denom).re;

    (zeros, poles, gain)
}

/// Expand `prod (1 - r_i z^-1)` into polynomial coefficients
fn expand_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= root * prev;
        }
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::SQRT_2;

    #[test]
    fn test_second_order_matches_closed_form() {
        let c = design(10.0, 500.0, 2, FilterKind::LowPass).unwrap();

        let k = (PI * 10.0 / 500.0).tan();
        let d = 1.0 + SQRT_2 * k + k * k;
        let b = [k * k / d, 2.0 * k * k / d, k * k / d];
        let a = [1.0, 2.0 * (k * k - 1.0) / d, (1.0 - SQRT_2 * k + k * k) / d];

        for (got, want) in c.feedforward().iter().zip(b.iter()) {
            assert!((got - want).abs() < 1e-12, "b: {} vs {}", got, want);
        }
        for (got, want) in c.feedback().iter().zip(a.iter()) {
            assert!((got - want).abs() < 1e-12, "a: {} vs {}", got, want);
        }
    }

    #[test]
    fn test_first_order() {
        let c = design(10.0, 500.0, 1, FilterKind::LowPass).unwrap();
        assert_eq!(c.order(), 1);
        // Zero at z = -1 gives b0 == b1
        assert!((c.feedforward()[0] - c.feedforward()[1]).abs() < 1e-15);
    }

    #[test]
    fn test_unity_dc_gain_and_half_power_cutoff() {
        for order in 1..=6 {
            let c = design(10.0, 500.0, order, FilterKind::LowPass).unwrap();
            assert_eq!(c.order(), order);
            assert_eq!(c.feedback()[0], 1.0);
            assert!(
                (c.dc_gain() - 1.0).abs() < 1e-6,
                "order {} DC gain {}",
                order,
                c.dc_gain()
            );
            let at_cutoff = c.magnitude_at(10.0, 500.0);
            assert!(
                (at_cutoff - 1.0 / SQRT_2).abs() < 1e-6,
                "order {} |H(fc)| = {}",
                order,
                at_cutoff
            );
        }
    }

    #[test]
    fn test_stopband_steepens_with_order() {
        let low = design(10.0, 500.0, 2, FilterKind::LowPass).unwrap();
        let high = design(10.0, 500.0, 6, FilterKind::LowPass).unwrap();
        let a_low = low.magnitude_at(50.0, 500.0);
        let a_high = high.magnitude_at(50.0, 500.0);
        assert!(a_high < a_low);
        assert!(a_high < 1e-4, "6th order at 5x cutoff: {}", a_high);
    }

    #[test]
    fn test_rejects_cutoff_at_or_above_nyquist() {
        assert!(matches!(
            design(250.0, 500.0, 2, FilterKind::LowPass),
            Err(FilterError::InvalidSpec(_))
        ));
        assert!(matches!(
            design(300.0, 500.0, 2, FilterKind::LowPass),
            Err(FilterError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        for (cutoff, fs, order) in [
            (0.0, 500.0, 2),
            (-5.0, 500.0, 2),
            (10.0, 0.0, 2),
            (10.0, 500.0, 0),
            (f64::NAN, 500.0, 2),
        ] {
            assert!(
                matches!(
                    design(cutoff, fs, order, FilterKind::LowPass),
                    Err(FilterError::InvalidSpec(_))
                ),
                "expected InvalidSpec for ({}, {}, {})",
                cutoff,
                fs,
                order
            );
        }
    }

    #[test]
    fn test_unsupported_kind_by_name() {
        assert!(design_by_name(10.0, 500.0, 2, "low-pass").is_ok());
        assert!(matches!(
            design_by_name(10.0, 500.0, 2, "highpass"),
            Err(FilterError::Unsupported(_))
        ));
    }

    #[test]
    fn test_spec_design_matches_free_function() {
        let spec = FilterSpec::lowpass(10.0, 500.0, 4);
        assert!((spec.normalized_cutoff() - 0.04).abs() < 1e-15);
        assert_eq!(
            spec.design().unwrap(),
            design(10.0, 500.0, 4, FilterKind::LowPass).unwrap()
        );
    }

    #[test]
    fn test_prototype_poles_on_unit_circle() {
        for p in prototype_poles(5) {
            assert!((p.norm() - 1.0).abs() < 1e-12);
            assert!(p.re < 0.0);
        }
    }

    #[test]
    fn test_high_order_degrades_but_still_designs() {
        let c = design(10.0, 500.0, 10, FilterKind::LowPass).unwrap();
        assert!((c.dc_gain() - 1.0).abs() < 1e-3);

        let c = design(10.0, 500.0, 16, FilterKind::LowPass).unwrap();
        assert_eq!(c.order(), 16);
        assert!((c.dc_gain() - 1.0).abs() > 1e-3, "dc gain {}", c.dc_gain());
    }
}

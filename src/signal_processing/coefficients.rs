use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{FilterError, Result};

/// Normalised transfer-function coefficients of a recursive filter
///
/// Holds the feedforward (`b`) and feedback (`a`) polynomials in descending
/// powers of z^-1. Both have length `order + 1` and `a[0] == 1`. Instances
/// are immutable once built, so one set of coefficients can be shared by
/// any number of independent streams.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    feedforward: Vec<f64>,
    feedback: Vec<f64>,
}

impl FilterCoefficients {
    /// Build coefficients from arbitrary numerator/denominator sequences
    ///
    /// Both sequences are divided by `a[0]`. The shorter one is zero-padded
    /// so that both have the same length.
    ///
    /// # Errors
    /// Returns `FilterError::InvalidSpec` if either sequence is empty,
    /// contains a non-finite value, `a[0]` is zero, or the division by
    /// `a[0]` overflows.
    pub fn new(feedforward: Vec<f64>, feedback: Vec<f64>) -> Result<Self> {
        if feedforward.is_empty() || feedback.is_empty() {
            return Err(FilterError::InvalidSpec(
                "coefficient sequences must not be empty".into(),
            ));
        }
        if feedforward.iter().chain(feedback.iter()).any(|c| !c.is_finite()) {
            return Err(FilterError::InvalidSpec(
                "coefficients must be finite".into(),
            ));
        }

        let a0 = feedback[0];
        if a0 == 0.0 {
            return Err(FilterError::InvalidSpec(
                "leading feedback coefficient must be non-zero".into(),
            ));
        }

        let len = feedforward.len().max(feedback.len());
        let mut b: Vec<f64> = feedforward.iter().map(|c| c / a0).collect();
        let mut a: Vec<f64> = feedback.iter().map(|c| c / a0).collect();
        b.resize(len, 0.0);
        a.resize(len, 0.0);
        a[0] = 1.0;

        // A tiny a[0] can overflow the normalised values
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(FilterError::InvalidSpec(format!(
                "coefficients overflow when normalised by a[0] = {:e}",
                a0
            )));
        }

        Ok(Self {
            feedforward: b,
            feedback: a,
        })
    }

    /// Filter order (number of delay elements)
    pub fn order(&self) -> usize {
        self.feedback.len() - 1
    }

    /// Feedforward (numerator) coefficients `b[0..=order]`
    pub fn feedforward(&self) -> &[f64] {
        &self.feedforward
    }

    /// Feedback (denominator) coefficients `a[0..=order]`, with `a[0] == 1`
    pub fn feedback(&self) -> &[f64] {
        &self.feedback
    }

    /// Gain at DC, `sum(b) / sum(a)`
    ///
    /// Infinite or NaN when the filter has a pole at z = 1.
    pub fn dc_gain(&self) -> f64 {
        self.feedforward.iter().sum::<f64>() / self.feedback.iter().sum::<f64>()
    }

    /// Magnitude of the frequency response at `freq_hz`
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate_hz: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / sample_rate_hz;
        let z_inv = Complex64::from_polar(1.0, -omega);

        let num = evaluate_polynomial(&self.feedforward, z_inv);
        let den = evaluate_polynomial(&self.feedback, z_inv);
        (num / den).norm()
    }
}

/// Horner evaluation of `c[0] + c[1] x + c[2] x^2 + ...`
fn evaluate_polynomial(coeffs: &[f64], x: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * x + c)
}

/// Delay-line history of one filter stream
///
/// Laid out in transposed direct form II: `order` elements, where element
/// `i` carries the contribution of past samples to output `n + i + 1`.
/// A state belongs to exactly one stream; clone it to fork a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    delay_line: Vec<f64>,
}

impl FilterState {
    /// Zero state of the given length (filter at rest)
    pub fn zeros(order: usize) -> Self {
        Self {
            delay_line: vec![0.0; order],
        }
    }

    /// Wrap a previously saved delay line
    pub fn from_vec(delay_line: Vec<f64>) -> Self {
        Self { delay_line }
    }

    pub fn len(&self) -> usize {
        self.delay_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delay_line.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.delay_line
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.delay_line
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.delay_line
    }
}

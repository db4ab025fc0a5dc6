//! Sample-by-sample evaluation of a recursive filter with explicit state.
//!
//! Every entry point funnels through [`step`], so batch and streaming
//! results follow the same rounding path and agree exactly.

use super::coefficients::{FilterCoefficients, FilterState};
use crate::constants::STEADY_STATE_EPSILON;
use crate::error::{FilterError, Result};

/// State of a filter at rest (all-zero history)
pub fn init_state(coefficients: &FilterCoefficients) -> FilterState {
    FilterState::zeros(coefficients.order())
}

/// State reached after holding the input at `input_value` forever
///
/// Seeding a stream with its first sample avoids the start-up transient
/// that a zero state produces when the signal sits on a non-zero baseline.
///
/// The fixed point solves `z = A z + B v` for the transposed direct form II
/// update. That system is upper triangular, so back substitution from the
/// last delay element gives the exact solution:
/// `y = dc_gain * v`, `z[i] = sum_{j>i} (b[j] v - a[j] y)`.
///
/// # Errors
/// Returns `FilterError::NoSteadyState` if the filter has a pole at DC.
pub fn init_steady_state(coefficients: &FilterCoefficients, input_value: f64) -> Result<FilterState> {
    let b = coefficients.feedforward();
    let a = coefficients.feedback();
    let order = coefficients.order();

    let a_sum: f64 = a.iter().sum();
    if a_sum.abs() < STEADY_STATE_EPSILON {
        return Err(FilterError::NoSteadyState);
    }
    let b_sum: f64 = b.iter().sum();
    let output = b_sum / a_sum * input_value;

    let mut state = FilterState::zeros(order);
    let z = state.as_mut_slice();
    let mut acc = 0.0;
    for i in (0..order).rev() {
        acc += b[i + 1] * input_value - a[i + 1] * output;
        z[i] = acc;
    }
    Ok(state)
}

/// Advance one sample, producing the new output and the next state
///
/// Pure: the caller's state is not touched.
///
/// # Errors
/// Returns `FilterError::DimensionMismatch` if `state.len() != order`.
pub fn process_one(
    coefficients: &FilterCoefficients,
    state: &FilterState,
    input_sample: f64,
) -> Result<(f64, FilterState)> {
    check_dimensions(coefficients, state)?;
    let mut next = state.clone();
    let output = step(coefficients, next.as_mut_slice(), input_sample);
    Ok((output, next))
}

/// Filter a whole sequence starting from `initial_state`
///
/// Observably identical to folding [`process_one`] over `input`.
pub fn process_batch(
    coefficients: &FilterCoefficients,
    initial_state: &FilterState,
    input: &[f64],
) -> Result<Vec<f64>> {
    process_batch_with_state(coefficients, initial_state, input).map(|(output, _)| output)
}

/// Like [`process_batch`], also returning the state after the last sample
///
/// Lets a caller filter a block at once and keep streaming afterwards.
pub fn process_batch_with_state(
    coefficients: &FilterCoefficients,
    initial_state: &FilterState,
    input: &[f64],
) -> Result<(Vec<f64>, FilterState)> {
    check_dimensions(coefficients, initial_state)?;
    let mut state = initial_state.clone();
    let output = input
        .iter()
        .map(|&x| step(coefficients, state.as_mut_slice(), x))
        .collect();
    Ok((output, state))
}

pub(crate) fn check_dimensions(coefficients: &FilterCoefficients, state: &FilterState) -> Result<()> {
    if state.len() != coefficients.order() {
        return Err(FilterError::DimensionMismatch {
            expected: coefficients.order(),
            actual: state.len(),
        });
    }
    Ok(())
}

/// Transposed direct form II update, in place
///
/// ```text
/// y      = b[0] x + z[0]
/// z[i]   = b[i+1] x - a[i+1] y + z[i+1]
/// z[N-1] = b[N] x - a[N] y
/// ```
///
/// Caller guarantees `z.len() == order`.
#[inline]
pub(crate) fn step(coefficients: &FilterCoefficients, z: &mut [f64], x: f64) -> f64 {
    let b = coefficients.feedforward();
    let a = coefficients.feedback();
    let n = z.len();
    debug_assert_eq!(n + 1, b.len());

    if n == 0 {
        return b[0] * x;
    }

    let y = b[0] * x + z[0];
    for i in 0..n - 1 {
        z[i] = b[i + 1] * x - a[i + 1] * y + z[i + 1];
    }
    z[n - 1] = b[n] * x - a[n] * y;
    y
}

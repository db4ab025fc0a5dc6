//! Numeric constants for filter design and state initialisation
//!
//! These thresholds guard the few places where the filter core divides by
//! a quantity derived from the coefficients.

/// Smallest `|sum(feedback)|` for which a steady state is computed.
/// Below this the filter has (numerically) a pole at z = 1 and the
/// constant-input fixed point does not exist.
pub const STEADY_STATE_EPSILON: f64 = 1e-12;

/// Orders above this lose noticeable precision in transfer-function form.
/// The designer logs a warning rather than refusing.
pub const TF_PRECISION_WARN_ORDER: usize = 8;

/// Default relative tolerance for batch vs. streaming comparison.
pub const DEFAULT_EQUIVALENCE_TOLERANCE: f64 = 1e-9;

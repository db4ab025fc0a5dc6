use super::coefficients::{FilterCoefficients, FilterState};
use super::engine;
use super::filter::Filter;
use crate::error::Result;
use serde::Deserialize;
use std::fmt;

/// How a stream's filter state is initialised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InitMode {
    /// All-zero history
    Rest,
    /// Steady state for the first input sample held forever
    #[default]
    Steady,
}

impl fmt::Display for InitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Steady => write!(f, "steady"),
        }
    }
}

/// One filtering session: shared coefficients plus a privately owned state
///
/// Wraps the engine's explicit-state functions for callers that would
/// rather hold a filter object than thread the state by hand. Independent
/// streams each need their own `StreamingFilter`.
pub struct StreamingFilter<'a> {
    coefficients: &'a FilterCoefficients,
    state: FilterState,
}

impl<'a> StreamingFilter<'a> {
    /// Start at rest
    pub fn at_rest(coefficients: &'a FilterCoefficients) -> Self {
        Self {
            coefficients,
            state: engine::init_state(coefficients),
        }
    }

    /// Start in the steady state for a constant `input_value`
    pub fn steady(coefficients: &'a FilterCoefficients, input_value: f64) -> Result<Self> {
        Ok(Self {
            coefficients,
            state: engine::init_steady_state(coefficients, input_value)?,
        })
    }

    /// Resume from a saved state
    ///
    /// # Errors
    /// Returns `FilterError::DimensionMismatch` if the state does not fit
    /// the coefficients.
    pub fn with_state(coefficients: &'a FilterCoefficients, state: FilterState) -> Result<Self> {
        engine::check_dimensions(coefficients, &state)?;
        Ok(Self {
            coefficients,
            state,
        })
    }

    /// Start according to `mode`, priming from `first_sample` when steady
    pub fn for_mode(
        coefficients: &'a FilterCoefficients,
        mode: InitMode,
        first_sample: Option<f64>,
    ) -> Result<Self> {
        match (mode, first_sample) {
            (InitMode::Steady, Some(v)) => Self::steady(coefficients, v),
            _ => Ok(Self::at_rest(coefficients)),
        }
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        self.coefficients
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn into_state(self) -> FilterState {
        self.state
    }

    /// Return to rest
    pub fn reset(&mut self) {
        self.state = engine::init_state(self.coefficients);
    }
}

impl Filter for StreamingFilter<'_> {
    fn process(&mut self, sample: f64) -> f64 {
        engine::step(self.coefficients, self.state.as_mut_slice(), sample)
    }
}

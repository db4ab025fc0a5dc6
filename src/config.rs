//! Configuration for the filter comparison harness.
//!
//! Defaults reproduce the reference scenario: a 5 Hz + 50 Hz tone mix
//! sampled at 500 Hz for one second, filtered by a 6th-order 10 Hz
//! Butterworth low-pass, with the streaming state primed from the first
//! sample.
//!
//! Every section may be given in a TOML file; missing keys fall back to
//! the defaults:
//!
//! ```toml
//! [filter]
//! cutoff = "10hz"
//! order = 6
//! kind = "lowpass"
//!
//! [signal]
//! sample_rate = 500
//! duration_secs = 1.0
//! tones = [{ freq = 5, amplitude = 1.0 }, { freq = "50hz", amplitude = 0.5 }]
//!
//! [stream]
//! init = "steady"
//! chunk_size = 1
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;

use crate::constants::DEFAULT_EQUIVALENCE_TOLERANCE;
use crate::error::{FilterError, Result};
use crate::signal_processing::FilterSpec;

pub use crate::signal_processing::{FilterKind, InitMode};

/// Frequency in Hz
///
/// # Parsing formats
/// - `10` or `10.5` - frequency in Hz (no suffix)
/// - `10hz` or `10Hz` - frequency in Hz (explicit)
/// - `1.5khz` or `1.5kHz` - frequency in kHz
///
/// # Example
/// ```
/// use butterstream::config::Frequency;
///
/// let freq: Frequency = "1.5khz".parse().unwrap();
/// assert!((freq.as_hz() - 1500.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "FrequencyRepr")]
pub struct Frequency(f64);

impl Frequency {
    pub fn from_hz(hz: f64) -> Self {
        Self(hz)
    }

    pub fn as_hz(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hz", self.0)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();

        let (num, scale) = if let Some(num) = lower.strip_suffix("khz") {
            (num, 1000.0)
        } else if let Some(num) = lower.strip_suffix("hz") {
            (num, 1.0)
        } else {
            (lower.as_str(), 1.0)
        };

        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid frequency: {}", s))?;
        if !value.is_finite() || value <= 0.0 {
            return Err("frequency must be positive".to_string());
        }
        Ok(Self::from_hz(value * scale))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrequencyRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<FrequencyRepr> for Frequency {
    type Error = String;

    fn try_from(repr: FrequencyRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            FrequencyRepr::Number(hz) if hz.is_finite() && hz > 0.0 => Ok(Self::from_hz(hz)),
            FrequencyRepr::Number(hz) => Err(format!("frequency must be positive, got {}", hz)),
            FrequencyRepr::Text(s) => s.parse(),
        }
    }
}

/// One sinusoidal component of a generated test signal
///
/// Parses from `<freq>[:<amplitude>]`, e.g. `50hz:0.5`. Amplitude
/// defaults to 1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ToneConfig {
    pub freq: Frequency,
    #[serde(default = "unit_amplitude")]
    pub amplitude: f64,
}

fn unit_amplitude() -> f64 {
    1.0
}

impl FromStr for ToneConfig {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (freq, amplitude) = match s.split_once(':') {
            Some((freq, amp)) => {
                let amp: f64 = amp
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid amplitude: {}", amp))?;
                (freq, amp)
            }
            None => (s, 1.0),
        };
        Ok(Self {
            freq: freq.parse()?,
            amplitude,
        })
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sample_rate: Option<Frequency>,
    pub cutoff: Option<Frequency>,
    pub order: Option<usize>,
    pub kind: Option<FilterKind>,
    pub tones: Vec<ToneConfig>,
    pub duration_secs: Option<f64>,
    pub init: Option<InitMode>,
    pub chunk_size: Option<usize>,
    pub tolerance: Option<f64>,
}

/// Complete harness configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Filter design parameters
    pub filter: FilterConfig,
    /// Generated input signal parameters
    pub signal: SignalConfig,
    /// Streaming session parameters
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// -3 dB cutoff
    pub cutoff: Frequency,
    /// Number of poles
    pub order: usize,
    pub kind: FilterKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Sampling frequency (overridden by the file rate for WAV input)
    pub sample_rate: Frequency,
    /// Length of the generated signal in seconds
    pub duration_secs: f64,
    /// Sinusoids summed into the generated signal
    pub tones: Vec<ToneConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Initial state for both batch and streaming runs
    pub init: InitMode,
    /// Samples per chunk handed from the source to the streaming consumer
    pub chunk_size: usize,
    /// Relative tolerance for batch vs. streaming agreement
    pub tolerance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff: Frequency::from_hz(10.0),
            order: 6,
            kind: FilterKind::LowPass,
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sample_rate: Frequency::from_hz(500.0),
            duration_secs: 1.0,
            tones: vec![
                ToneConfig {
                    freq: Frequency::from_hz(5.0),
                    amplitude: 1.0,
                },
                ToneConfig {
                    freq: Frequency::from_hz(50.0),
                    amplitude: 0.5,
                },
            ],
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            init: InitMode::Steady,
            chunk_size: 1,
            tolerance: DEFAULT_EQUIVALENCE_TOLERANCE,
        }
    }
}

impl HarnessConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns `FilterError::Config` on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| FilterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the config file if any, then `overrides`
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Replace every value that `overrides` sets
    ///
    /// An empty tone list leaves the configured tones alone.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(sample_rate) = overrides.sample_rate {
            self.signal.sample_rate = sample_rate;
        }
        if let Some(cutoff) = overrides.cutoff {
            self.filter.cutoff = cutoff;
        }
        if let Some(order) = overrides.order {
            self.filter.order = order;
        }
        if let Some(kind) = overrides.kind {
            self.filter.kind = kind;
        }
        if !overrides.tones.is_empty() {
            self.signal.tones = overrides.tones.clone();
        }
        if let Some(duration) = overrides.duration_secs {
            self.signal.duration_secs = duration;
        }
        if let Some(init) = overrides.init {
            self.stream.init = init;
        }
        if let Some(chunk_size) = overrides.chunk_size {
            self.stream.chunk_size = chunk_size;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.stream.tolerance = tolerance;
        }
    }

    /// Harness-level checks; filter parameters are checked by the designer
    pub fn validate(&self) -> Result<()> {
        if self.stream.chunk_size == 0 {
            return Err(FilterError::Config("chunk_size must be at least 1".into()));
        }
        if !self.signal.duration_secs.is_finite() || self.signal.duration_secs < 0.0 {
            return Err(FilterError::Config(format!(
                "duration_secs must be non-negative, got {}",
                self.signal.duration_secs
            )));
        }
        if !self.stream.tolerance.is_finite() || self.stream.tolerance < 0.0 {
            return Err(FilterError::Config(format!(
                "tolerance must be non-negative, got {}",
                self.stream.tolerance
            )));
        }
        Ok(())
    }

    /// Filter design at the given sample rate
    pub fn filter_spec(&self, sample_rate_hz: f64) -> FilterSpec {
        FilterSpec {
            cutoff_hz: self.filter.cutoff.as_hz(),
            sample_rate_hz,
            order: self.filter.order,
            kind: self.filter.kind,
        }
    }
}

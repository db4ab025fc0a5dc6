pub mod comparison;
pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod signal_processing;
pub mod source;
pub mod wav;

pub use config::HarnessConfig;
pub use error::{FilterError, Result};
pub use signal_processing::{
    FilterCoefficients, FilterKind, FilterSpec, FilterState, InitMode, StreamingFilter, design,
    init_state, init_steady_state, process_batch, process_one,
};
pub use wav::save_wav;

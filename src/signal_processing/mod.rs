pub mod butterworth;
pub mod channels;
pub mod coefficients;
pub mod engine;
pub mod filter;
pub mod sos;
pub mod streaming;

pub use butterworth::{FilterKind, FilterSpec, design, design_by_name};
pub use channels::filter_channels;
pub use coefficients::{FilterCoefficients, FilterState};
pub use engine::{
    init_state, init_steady_state, process_batch, process_batch_with_state, process_one,
};
pub use filter::Filter;
pub use sos::SosLowpass;
pub use streaming::{InitMode, StreamingFilter};

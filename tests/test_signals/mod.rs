// Each test crate uses a different subset of the generators
#![allow(dead_code, unused_imports)]

pub mod generate;

pub use generate::{
    direct_form_reference, impulse, step, sweep, tone_mix, two_tone_scenario_signal,
};

//! Sample models for demonstrating the inspection helpers
pub mod forest;

pub use forest::{create_sample_lp, logistic_yield, schedule_generator, Stand};

pub mod infra;
pub mod metrics;
pub mod runtime;

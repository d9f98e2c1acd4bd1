pub mod annuity;
pub mod metrics;
pub mod progress;
pub mod project;
pub mod schedule;

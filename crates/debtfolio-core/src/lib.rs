pub mod annuity;
pub mod error;
pub mod metrics;
pub mod progress;
pub mod projection;
pub mod schedule;
pub mod types;

pub use error::DebtfolioError;
pub use types::*;

/// Standard result type for all debtfolio operations
pub type DebtfolioResult<T> = Result<T, DebtfolioError>;

pub mod catalog;
pub mod config;
pub mod error;
pub mod loan;
pub mod report;
pub mod sink;

pub use error::LoanViewError;

/// Result type shared by every fallible operation in the crate
pub type LoanViewResult<T> = Result<T, LoanViewError>;

//! Flexile Core - cap table and dividend distribution domain.
//!
//! This crate contains the business logic for computing dividends and
//! return-of-capital distributions. It is database-agnostic and defines
//! traits that are implemented by the `storage-sqlite` crate.

pub mod cap_table;
pub mod constants;
pub mod dividends;
pub mod errors;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

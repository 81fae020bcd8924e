//! SQLite storage implementation for the Flexile dividend engine.
//!
//! This crate owns every Diesel dependency in the workspace. It implements the
//! repository traits defined in `flexile-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Embedded Diesel migrations
//! - Cap table and dividend repositories
//! - Database model types (with Diesel derives)
//!
//! ```text
//!   core (allocation engine, services)
//!                  │
//!                  ▼
//!      storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod cap_table;
pub mod dividends;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from flexile-core for convenience
pub use flexile_core::errors::{DatabaseError, Error, Result};

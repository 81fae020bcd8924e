//! Dividend computation and round storage.

mod model;
mod repository;

pub use model::{
    DividendComputationDB, DividendComputationOutputDB, DividendDB, DividendRoundDB,
};
pub use repository::{DividendComputationRepository, DividendRoundRepository};

//! Dividends module - computation, allocation, exports and distribution rounds.

mod allocation;
mod computation_generator;
mod dividends_model;
mod dividends_service;
mod dividends_traits;
mod export;

pub use allocation::{
    aggregate, build_payouts, generate_distribution, payout_drift, SafeDividends, ShareDividends,
};
pub use computation_generator::{
    generate_computation_outputs, ComputationGenerator, CONVERTIBLE_SHARE_CLASS_NAME,
};
pub use dividends_model::*;
pub use dividends_service::DividendService;
pub use dividends_traits::{
    DividendComputationRepositoryTrait, DividendRoundRepositoryTrait, DividendServiceTrait,
};
pub use export::{
    export_by_investor, export_by_security, export_computation, export_final_creation_list,
    BY_INVESTOR_HEADERS, BY_SECURITY_HEADERS, FINAL_CREATION_HEADERS,
};


#[cfg(test)]
mod dividends_model_tests;

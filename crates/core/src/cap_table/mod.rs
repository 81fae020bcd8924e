//! Cap table module - investors, share classes, holdings and convertibles.

mod cap_table_model;
mod cap_table_service;
mod cap_table_traits;

pub use cap_table_model::{
    CapTable, CapTableImport, CompanyInvestor, ConvertibleInvestment, ConvertibleSecurity,
    NewCompanyInvestor, NewConvertibleInvestment, NewConvertibleSecurity, NewShareClass,
    NewShareHolding, ShareClass, ShareHolding,
};
pub use cap_table_service::CapTableService;
pub use cap_table_traits::{CapTableRepositoryTrait, CapTableServiceTrait};

#[cfg(test)]
mod cap_table_model_tests;

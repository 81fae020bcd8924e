//! Cap table storage.

mod model;
mod repository;

pub use model::{
    CompanyInvestorDB, ConvertibleInvestmentDB, ConvertibleSecurityDB, ShareClassDB,
    ShareHoldingDB,
};
pub use repository::CapTableRepository;

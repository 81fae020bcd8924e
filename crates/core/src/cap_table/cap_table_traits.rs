use crate::cap_table::cap_table_model::{CapTable, CapTableImport, ConvertibleInvestment};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for cap table repository operations
#[async_trait]
pub trait CapTableRepositoryTrait: Send + Sync {
    fn load_cap_table(&self, company_id: &str) -> Result<CapTable>;
    fn get_convertible_investments(&self, company_id: &str) -> Result<Vec<ConvertibleInvestment>>;
    async fn import_cap_table(&self, company_id: String, import: CapTableImport) -> Result<usize>;
}

/// Trait for cap table service operations
#[async_trait]
pub trait CapTableServiceTrait: Send + Sync {
    fn get_cap_table(&self, company_id: &str) -> Result<CapTable>;
    async fn import_cap_table(&self, company_id: &str, import: CapTableImport) -> Result<CapTable>;
}

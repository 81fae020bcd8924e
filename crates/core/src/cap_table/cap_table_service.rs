use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::cap_table_model::{CapTable, CapTableImport};
use super::cap_table_traits::{CapTableRepositoryTrait, CapTableServiceTrait};
use crate::errors::Result;

pub struct CapTableService {
    repository: Arc<dyn CapTableRepositoryTrait>,
}

impl CapTableService {
    pub fn new(repository: Arc<dyn CapTableRepositoryTrait>) -> Self {
        CapTableService { repository }
    }
}

#[async_trait]
impl CapTableServiceTrait for CapTableService {
    fn get_cap_table(&self, company_id: &str) -> Result<CapTable> {
        debug!("Loading cap table for company {}", company_id);
        self.repository.load_cap_table(company_id)
    }

    async fn import_cap_table(&self, company_id: &str, import: CapTableImport) -> Result<CapTable> {
        import.validate()?;
        let inserted = self
            .repository
            .import_cap_table(company_id.to_string(), import)
            .await?;
        info!(
            "Imported {} cap table records for company {}",
            inserted, company_id
        );
        self.repository.load_cap_table(company_id)
    }
}

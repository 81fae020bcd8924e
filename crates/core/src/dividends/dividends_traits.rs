use crate::dividends::dividends_model::{
    AllocationResult, ComputationOutput, DistributionRequest, Dividend, DividendComputation,
    DividendComputationDetails, DividendRound, DividendRoundWithDividends, ExportVariant,
    NewDistribution, NewDividendComputation,
};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for dividend computation repository operations
#[async_trait]
pub trait DividendComputationRepositoryTrait: Send + Sync {
    fn get_computation(&self, company_id: &str, computation_id: &str) -> Result<DividendComputation>;
    fn list_computations(&self, company_id: &str) -> Result<Vec<DividendComputation>>;
    fn get_outputs(&self, computation_id: &str) -> Result<Vec<ComputationOutput>>;
    async fn create_computation(
        &self,
        new_computation: NewDividendComputation,
    ) -> Result<DividendComputation>;
}

/// Trait for dividend round repository operations
#[async_trait]
pub trait DividendRoundRepositoryTrait: Send + Sync {
    fn get_round(&self, company_id: &str, round_id: &str) -> Result<DividendRound>;
    fn get_dividends_for_round(&self, round_id: &str) -> Result<Vec<Dividend>>;
    /// Persists the round and its dividends and links the computation to the
    /// round, all in one transaction. Fails if the computation is already
    /// linked to a round.
    async fn create_round_with_dividends(
        &self,
        computation_id: String,
        distribution: NewDistribution,
    ) -> Result<DividendRound>;
}

/// Trait for dividend service operations
#[async_trait]
pub trait DividendServiceTrait: Send + Sync {
    async fn create_computation(
        &self,
        company_id: &str,
        request: DistributionRequest,
    ) -> Result<DividendComputation>;
    fn get_computation(&self, company_id: &str, computation_id: &str) -> Result<DividendComputation>;
    fn get_computation_details(
        &self,
        company_id: &str,
        computation_id: &str,
    ) -> Result<DividendComputationDetails>;
    fn list_computations(&self, company_id: &str) -> Result<Vec<DividendComputation>>;
    fn get_payouts(&self, company_id: &str, computation_id: &str) -> Result<Vec<AllocationResult>>;
    fn export_csv(
        &self,
        company_id: &str,
        computation_id: &str,
        variant: ExportVariant,
    ) -> Result<String>;
    async fn finalize_computation(
        &self,
        company_id: &str,
        computation_id: &str,
    ) -> Result<DividendRound>;
    fn get_round(&self, company_id: &str, round_id: &str) -> Result<DividendRoundWithDividends>;
}

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::allocation::{aggregate, build_payouts, generate_distribution, payout_drift};
use super::computation_generator::ComputationGenerator;
use super::dividends_model::{
    AllocationResult, ComputationOutput, DistributionRequest, DividendComputation,
    DividendComputationDetails, DividendRound, DividendRoundWithDividends, ExportVariant,
    NewDividendComputation,
};
use super::dividends_traits::{
    DividendComputationRepositoryTrait, DividendRoundRepositoryTrait, DividendServiceTrait,
};
use super::export::export_computation;
use crate::cap_table::CapTableRepositoryTrait;
use crate::constants::PAYOUT_DRIFT_WARNING_THRESHOLD;
use crate::errors::{AllocationError, Result};
use crate::utils::decimal_utils::round_to_cents;

pub struct DividendService {
    cap_table_repository: Arc<dyn CapTableRepositoryTrait>,
    computation_repository: Arc<dyn DividendComputationRepositoryTrait>,
    round_repository: Arc<dyn DividendRoundRepositoryTrait>,
}

impl DividendService {
    pub fn new(
        cap_table_repository: Arc<dyn CapTableRepositoryTrait>,
        computation_repository: Arc<dyn DividendComputationRepositoryTrait>,
        round_repository: Arc<dyn DividendRoundRepositoryTrait>,
    ) -> Self {
        DividendService {
            cap_table_repository,
            computation_repository,
            round_repository,
        }
    }

    fn compute_payouts(
        &self,
        company_id: &str,
        outputs: &[ComputationOutput],
    ) -> Result<Vec<AllocationResult>> {
        let (share_dividends, safe_dividends) = aggregate(outputs);
        let convertibles = if safe_dividends.is_empty() {
            Vec::new()
        } else {
            self.cap_table_repository
                .get_convertible_investments(company_id)?
        };
        build_payouts(&share_dividends, &safe_dividends, &convertibles)
    }
}

#[async_trait]
impl DividendServiceTrait for DividendService {
    async fn create_computation(
        &self,
        company_id: &str,
        request: DistributionRequest,
    ) -> Result<DividendComputation> {
        request.validate()?;
        let request = DistributionRequest {
            amount_in_usd: round_to_cents(request.amount_in_usd),
            ..request
        };

        let cap_table = self.cap_table_repository.load_cap_table(company_id)?;
        let outputs = ComputationGenerator::new(&request, &cap_table).generate()?;
        debug!(
            "Generated {} computation outputs for company {}",
            outputs.len(),
            company_id
        );

        let computation = self
            .computation_repository
            .create_computation(NewDividendComputation {
                company_id: company_id.to_string(),
                total_amount_in_usd: request.amount_in_usd,
                dividends_issuance_date: request.dividends_issuance_date,
                return_of_capital: request.return_of_capital,
                outputs,
            })
            .await?;

        info!(
            "Created dividend computation {} for company {} ({} USD)",
            computation.id, company_id, computation.total_amount_in_usd
        );
        Ok(computation)
    }

    fn get_computation(&self, company_id: &str, computation_id: &str) -> Result<DividendComputation> {
        self.computation_repository
            .get_computation(company_id, computation_id)
    }

    fn get_computation_details(
        &self,
        company_id: &str,
        computation_id: &str,
    ) -> Result<DividendComputationDetails> {
        let computation = self
            .computation_repository
            .get_computation(company_id, computation_id)?;
        let outputs = self.computation_repository.get_outputs(&computation.id)?;
        let payouts = self.compute_payouts(company_id, &outputs)?;
        Ok(DividendComputationDetails {
            computation,
            outputs,
            payouts,
        })
    }

    fn list_computations(&self, company_id: &str) -> Result<Vec<DividendComputation>> {
        self.computation_repository.list_computations(company_id)
    }

    fn get_payouts(&self, company_id: &str, computation_id: &str) -> Result<Vec<AllocationResult>> {
        let computation = self
            .computation_repository
            .get_computation(company_id, computation_id)?;
        let outputs = self.computation_repository.get_outputs(&computation.id)?;
        self.compute_payouts(company_id, &outputs)
    }

    fn export_csv(
        &self,
        company_id: &str,
        computation_id: &str,
        variant: ExportVariant,
    ) -> Result<String> {
        let computation = self
            .computation_repository
            .get_computation(company_id, computation_id)?;
        let outputs = self.computation_repository.get_outputs(&computation.id)?;
        let cap_table = self.cap_table_repository.load_cap_table(company_id)?;
        debug!(
            "Exporting computation {} as {}",
            computation.id,
            variant.as_str()
        );
        export_computation(
            variant,
            &outputs,
            &cap_table.convertible_investments,
            &cap_table.investor_names(),
        )
    }

    async fn finalize_computation(
        &self,
        company_id: &str,
        computation_id: &str,
    ) -> Result<DividendRound> {
        let computation = self
            .computation_repository
            .get_computation(company_id, computation_id)?;
        if let Some(round_id) = &computation.dividend_round_id {
            return Err(AllocationError::ComputationAlreadyFinalized {
                computation_id: computation.id.clone(),
                dividend_round_id: round_id.clone(),
            }
            .into());
        }

        let outputs = self.computation_repository.get_outputs(&computation.id)?;
        let payouts = self.compute_payouts(company_id, &outputs)?;

        let drift = payout_drift(computation.total_amount_in_usd, &payouts);
        if !payouts.is_empty() && drift.abs() > PAYOUT_DRIFT_WARNING_THRESHOLD {
            warn!(
                "Payouts for computation {} differ from the requested total by {} USD",
                computation.id, drift
            );
        }

        let distribution = generate_distribution(
            company_id,
            computation.total_amount_in_usd,
            computation.dividends_issuance_date,
            computation.return_of_capital,
            &payouts,
        )?;
        let round = self
            .round_repository
            .create_round_with_dividends(computation.id.clone(), distribution)
            .await?;

        info!(
            "Finalized computation {} into dividend round {} ({} shareholders, {} cents)",
            computation.id, round.id, round.number_of_shareholders, round.total_amount_in_cents
        );
        Ok(round)
    }

    fn get_round(&self, company_id: &str, round_id: &str) -> Result<DividendRoundWithDividends> {
        let round = self.round_repository.get_round(company_id, round_id)?;
        let dividends = self.round_repository.get_dividends_for_round(&round.id)?;
        Ok(DividendRoundWithDividends { round, dividends })
    }
}

//! Per-share dividend computation over a company's cap table.
//!
//! Preferred share classes are paid their preferred dividend first (scaled
//! down pro-rata when the distribution cannot cover it). The remainder is
//! split per share across every holding plus the implied shares of each
//! convertible investment. Convertible rows are booked against the SAFE
//! holder's entity name and re-attributed later by the allocation step.

use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use super::dividends_model::{ComputationOutput, DistributionRequest, PayeeRef};
use crate::cap_table::CapTable;
use crate::constants::QUALIFIED_HOLDING_PERIOD_DAYS;
use crate::errors::{Result, ValidationError};
use crate::utils::decimal_utils::round_to_cents;
use crate::utils::time_utils::held_at_least;

/// Share class label used for rows derived from convertible investments.
pub const CONVERTIBLE_SHARE_CLASS_NAME: &str = "Convertible";

/// Unrounded amounts for one (payee, share class) pairing.
#[derive(Debug, Default)]
struct OutputAccumulator {
    number_of_shares: i64,
    preferred: Decimal,
    dividend: Decimal,
    qualified: Decimal,
    investment_amount_cents: i64,
    has_investment_amount: bool,
}

impl OutputAccumulator {
    fn add(
        &mut self,
        shares: i64,
        preferred: Decimal,
        dividend: Decimal,
        qualified: bool,
        investment_amount_cents: i64,
    ) {
        self.number_of_shares += shares;
        self.preferred += preferred;
        self.dividend += dividend;
        if qualified {
            self.qualified += preferred + dividend;
        }
        self.investment_amount_cents += investment_amount_cents;
        self.has_investment_amount = true;
    }
}

pub struct ComputationGenerator<'a> {
    request: &'a DistributionRequest,
    cap_table: &'a CapTable,
}

impl<'a> ComputationGenerator<'a> {
    pub fn new(request: &'a DistributionRequest, cap_table: &'a CapTable) -> Self {
        Self { request, cap_table }
    }

    /// Whether dividends on a position acquired on `acquired_on` are qualified.
    fn is_qualified(&self, acquired_on: chrono::NaiveDate) -> bool {
        !self.request.return_of_capital
            && held_at_least(
                acquired_on,
                self.request.dividends_issuance_date,
                QUALIFIED_HOLDING_PERIOD_DAYS,
            )
    }

    pub fn generate(&self) -> Result<Vec<ComputationOutput>> {
        let amount = round_to_cents(self.request.amount_in_usd);
        let classes = self.cap_table.share_classes_by_id();

        // Preferred entitlements, in holding order.
        let mut entitlements = Vec::with_capacity(self.cap_table.share_holdings.len());
        for holding in &self.cap_table.share_holdings {
            let class = classes.get(holding.share_class_id.as_str()).ok_or_else(|| {
                ValidationError::InvalidInput(format!(
                    "Share holding {} references unknown share class {}",
                    holding.id, holding.share_class_id
                ))
            })?;
            let per_share = class.preferred_dividend_per_share().unwrap_or(Decimal::ZERO);
            entitlements.push(per_share * Decimal::from(holding.number_of_shares));
        }
        let total_preferred: Decimal = entitlements.iter().copied().sum();

        let preferred_exceeds_amount = total_preferred > Decimal::ZERO && total_preferred >= amount;
        let (preferred_scale, remainder) = if preferred_exceeds_amount {
            (amount / total_preferred, Decimal::ZERO)
        } else {
            (Decimal::ONE, amount - total_preferred)
        };

        let eligible_shares: i64 = self.cap_table.total_shares()
            + self
                .cap_table
                .convertible_investments
                .iter()
                .map(|c| c.implied_shares)
                .sum::<i64>();

        if eligible_shares == 0 {
            debug!(
                "Company {} has no eligible shares, nothing to compute",
                self.cap_table.company_id
            );
            return Ok(Vec::new());
        }

        let per_share = remainder / Decimal::from(eligible_shares);
        debug!(
            "Computing {} USD for company {}: preferred {} (scale {}), {} per share over {} shares",
            amount,
            self.cap_table.company_id,
            total_preferred,
            preferred_scale,
            per_share,
            eligible_shares
        );

        let mut rows: BTreeMap<(PayeeRef, String), OutputAccumulator> = BTreeMap::new();

        for (holding, entitlement) in self.cap_table.share_holdings.iter().zip(&entitlements) {
            if holding.number_of_shares == 0 {
                continue;
            }
            // Presence checked while computing entitlements.
            let class_name = classes
                .get(holding.share_class_id.as_str())
                .map(|c| c.name.clone())
                .unwrap_or_default();
            rows.entry((
                PayeeRef::Investor(holding.company_investor_id.clone()),
                class_name,
            ))
            .or_default()
            .add(
                holding.number_of_shares,
                *entitlement * preferred_scale,
                per_share * Decimal::from(holding.number_of_shares),
                self.is_qualified(holding.originally_acquired_at),
                holding.total_amount_in_cents,
            );
        }

        for investment in &self.cap_table.convertible_investments {
            if investment.implied_shares == 0 {
                continue;
            }
            rows.entry((
                PayeeRef::SafeHolder(investment.entity_name.clone()),
                CONVERTIBLE_SHARE_CLASS_NAME.to_string(),
            ))
            .or_default()
            .add(
                investment.implied_shares,
                Decimal::ZERO,
                per_share * Decimal::from(investment.implied_shares),
                self.is_qualified(investment.issued_at),
                investment.amount_in_cents,
            );
        }

        let mut outputs: Vec<ComputationOutput> = rows
            .into_iter()
            .map(|((payee, share_class), acc)| {
                let preferred = round_to_cents(acc.preferred);
                let dividend = round_to_cents(acc.dividend);
                ComputationOutput {
                    payee,
                    share_class,
                    number_of_shares: acc.number_of_shares,
                    preferred_dividend_amount_in_usd: preferred,
                    dividend_amount_in_usd: dividend,
                    total_amount_in_usd: preferred + dividend,
                    qualified_dividend_amount_usd: round_to_cents(acc.qualified),
                    investment_amount_cents: acc
                        .has_investment_amount
                        .then_some(acc.investment_amount_cents),
                }
            })
            .collect();

        Self::absorb_rounding_residual(&mut outputs, amount);
        Ok(outputs)
    }

    /// Books the cent residual left by per-row rounding on the largest row so
    /// the outputs sum exactly to the distribution amount.
    fn absorb_rounding_residual(outputs: &mut [ComputationOutput], amount: Decimal) {
        let allocated: Decimal = outputs.iter().map(|o| o.total_amount_in_usd).sum();
        let residual = amount - allocated;
        if residual.is_zero() {
            return;
        }

        // First row wins ties so the choice is deterministic.
        let mut largest: Option<(usize, Decimal)> = None;
        for (idx, output) in outputs.iter().enumerate() {
            if largest.map_or(true, |(_, max)| output.total_amount_in_usd > max) {
                largest = Some((idx, output.total_amount_in_usd));
            }
        }

        if let Some((idx, _)) = largest {
            let output = &mut outputs[idx];
            let fully_qualified = output.qualified_dividend_amount_usd == output.total_amount_in_usd;
            output.dividend_amount_in_usd += residual;
            output.total_amount_in_usd += residual;
            if fully_qualified {
                output.qualified_dividend_amount_usd = output.total_amount_in_usd;
            }
            debug!("Absorbed rounding residual of {} USD", residual);
        }
    }
}

/// Convenience wrapper around [`ComputationGenerator`].
pub fn generate_computation_outputs(
    request: &DistributionRequest,
    cap_table: &CapTable,
) -> Result<Vec<ComputationOutput>> {
    ComputationGenerator::new(request, cap_table).generate()
}

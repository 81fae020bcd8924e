//! Allocation engine: turns per-share-class computation outputs into
//! per-investor payouts and dividend round records.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use log::{debug, error};
use rust_decimal::Decimal;

use super::dividends_model::{
    AggregatedDividend, AllocationResult, ComputationOutput, NewDistribution, NewDividend,
    NewDividendRound, PayeeRef,
};
use crate::cap_table::ConvertibleInvestment;
use crate::constants::CENTS_PER_DOLLAR;
use crate::errors::{AllocationError, Result};
use crate::utils::decimal_utils::{round_to_cents, usd_to_cents};

/// Aggregated totals keyed by company investor id.
pub type ShareDividends = BTreeMap<String, AggregatedDividend>;

/// Aggregated totals keyed by SAFE holder entity name.
pub type SafeDividends = BTreeMap<String, AggregatedDividend>;

/// Groups computation outputs by payee and sums their amounts.
pub fn aggregate(outputs: &[ComputationOutput]) -> (ShareDividends, SafeDividends) {
    let mut share_dividends = ShareDividends::new();
    let mut safe_dividends = SafeDividends::new();

    for output in outputs {
        let entry = match &output.payee {
            PayeeRef::Investor(id) => share_dividends.entry(id.clone()).or_default(),
            PayeeRef::SafeHolder(name) => safe_dividends.entry(name.clone()).or_default(),
        };
        entry.add(output);
    }

    debug!(
        "Aggregated {} outputs into {} shareholders and {} SAFE holders",
        outputs.len(),
        share_dividends.len(),
        safe_dividends.len()
    );
    (share_dividends, safe_dividends)
}

/// Emits one payout per direct shareholder and one per convertible security
/// underlying each SAFE holder.
///
/// SAFE-held amounts are prorated by each security's principal over the
/// investment total and rounded to cents at that point.
pub fn build_payouts(
    share_dividends: &ShareDividends,
    safe_dividends: &SafeDividends,
    convertible_investments: &[ConvertibleInvestment],
) -> Result<Vec<AllocationResult>> {
    let mut payouts: Vec<AllocationResult> = share_dividends
        .iter()
        .map(|(investor_id, dividend)| AllocationResult {
            company_investor_id: investor_id.clone(),
            number_of_shares: Some(dividend.number_of_shares),
            total_amount: dividend.total_amount,
            qualified_dividends_amount: dividend.qualified_dividends_amount,
            investment_amount_cents: dividend.investment_amount_cents,
        })
        .collect();

    let cents_per_dollar = Decimal::from(CENTS_PER_DOLLAR);
    for (entity_name, dividend) in safe_dividends {
        let investment = convertible_investments
            .iter()
            .find(|c| &c.entity_name == entity_name)
            .ok_or_else(|| {
                error!("No convertible investment matches SAFE holder '{}'", entity_name);
                AllocationError::ConvertibleInvestmentNotFound {
                    entity_name: entity_name.clone(),
                }
            })?;

        if investment.amount_in_cents == 0 {
            return Err(AllocationError::ZeroInvestmentTotal {
                investment_id: investment.id.clone(),
            }
            .into());
        }
        let principal_total_in_cents = investment.principal_total_in_cents();
        if principal_total_in_cents != investment.amount_in_cents {
            error!(
                "Convertible investment {} securities total {} cents, expected {}",
                investment.id, principal_total_in_cents, investment.amount_in_cents
            );
            return Err(AllocationError::UnbalancedConvertibleInvestment {
                investment_id: investment.id.clone(),
                amount_in_cents: investment.amount_in_cents,
                principal_total_in_cents,
            }
            .into());
        }
        let investment_total = Decimal::from(investment.amount_in_cents) / cents_per_dollar;

        for security in &investment.convertible_securities {
            let security_share = Decimal::from(security.principal_value_in_cents) / cents_per_dollar;
            let proration = security_share / investment_total;
            payouts.push(AllocationResult {
                company_investor_id: security.company_investor_id.clone(),
                number_of_shares: None,
                total_amount: round_to_cents(dividend.total_amount * proration),
                qualified_dividends_amount: round_to_cents(
                    dividend.qualified_dividends_amount * proration,
                ),
                investment_amount_cents: security.principal_value_in_cents,
            });
        }
    }

    Ok(payouts)
}

/// Difference between the requested total and what the payouts add up to.
pub fn payout_drift(total_amount_in_usd: Decimal, payouts: &[AllocationResult]) -> Decimal {
    let allocated: Decimal = payouts.iter().map(|p| p.total_amount).sum();
    total_amount_in_usd - allocated
}

/// Builds the dividend round and one dividend per payout.
///
/// The returned records are not persisted; calling this twice for the same
/// payouts produces two independent distributions.
pub fn generate_distribution(
    company_id: &str,
    total_amount_in_usd: Decimal,
    issuance_date: NaiveDate,
    return_of_capital: bool,
    payouts: &[AllocationResult],
) -> Result<NewDistribution> {
    let number_of_shares: i64 = payouts.iter().filter_map(|p| p.number_of_shares).sum();
    let number_of_shareholders = payouts
        .iter()
        .map(|p| p.company_investor_id.as_str())
        .collect::<HashSet<_>>()
        .len() as i64;

    let round = NewDividendRound {
        company_id: company_id.to_string(),
        issued_at: issuance_date,
        number_of_shares,
        number_of_shareholders,
        total_amount_in_cents: usd_to_cents(total_amount_in_usd)?,
        return_of_capital,
    };

    let dividends = payouts
        .iter()
        .map(|payout| {
            Ok(NewDividend {
                company_investor_id: payout.company_investor_id.clone(),
                number_of_shares: payout.number_of_shares,
                total_amount_in_cents: usd_to_cents(payout.total_amount)?,
                qualified_amount_cents: usd_to_cents(payout.qualified_dividends_amount)?,
                investment_amount_cents: payout.investment_amount_cents,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NewDistribution { round, dividends })
}

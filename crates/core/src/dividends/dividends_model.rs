//! Dividend computation and distribution domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Administrator request to distribute an amount across the cap table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributionRequest {
    pub amount_in_usd: Decimal,
    pub dividends_issuance_date: NaiveDate,
    #[serde(default)]
    pub return_of_capital: bool,
}

impl DistributionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.amount_in_usd <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Distribution amount must be greater than zero, got {}",
                self.amount_in_usd
            ))));
        }
        Ok(())
    }
}

/// Who a computation output is booked against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum PayeeRef {
    /// A registered company investor, by id.
    Investor(String),
    /// A SAFE holder, by the entity name on the convertible investment.
    SafeHolder(String),
}

impl PayeeRef {
    /// Builds a payee from the nullable id/name column pair used in storage.
    pub fn from_parts(investor_id: Option<String>, investor_name: Option<String>) -> Result<Self> {
        match (investor_id, investor_name) {
            (Some(id), None) => Ok(PayeeRef::Investor(id)),
            (None, Some(name)) => Ok(PayeeRef::SafeHolder(name)),
            (Some(id), Some(name)) => Err(Error::Validation(ValidationError::InvalidInput(
                format!(
                    "Computation output has both investor id '{}' and investor name '{}'",
                    id, name
                ),
            ))),
            (None, None) => Err(Error::Validation(ValidationError::MissingField(
                "company_investor_id or investor_name".to_string(),
            ))),
        }
    }
}

/// One (payee, share class) row of a dividend computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputationOutput {
    pub payee: PayeeRef,
    pub share_class: String,
    pub number_of_shares: i64,
    pub preferred_dividend_amount_in_usd: Decimal,
    pub dividend_amount_in_usd: Decimal,
    pub total_amount_in_usd: Decimal,
    pub qualified_dividend_amount_usd: Decimal,
    pub investment_amount_cents: Option<i64>,
}

/// Per-payee totals produced by aggregating computation outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDividend {
    pub number_of_shares: i64,
    pub total_amount: Decimal,
    pub qualified_dividends_amount: Decimal,
    pub investment_amount_cents: i64,
}

impl AggregatedDividend {
    pub fn add(&mut self, output: &ComputationOutput) {
        self.number_of_shares += output.number_of_shares;
        self.total_amount += output.total_amount_in_usd;
        self.qualified_dividends_amount += output.qualified_dividend_amount_usd;
        self.investment_amount_cents += output.investment_amount_cents.unwrap_or(0);
    }
}

/// A single payout owed to a company investor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub company_investor_id: String,
    /// None for rows re-attributed from a SAFE holder.
    pub number_of_shares: Option<i64>,
    pub total_amount: Decimal,
    pub qualified_dividends_amount: Decimal,
    pub investment_amount_cents: i64,
}

/// A persisted dividend computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DividendComputation {
    pub id: String,
    pub company_id: String,
    pub total_amount_in_usd: Decimal,
    pub dividends_issuance_date: NaiveDate,
    pub return_of_capital: bool,
    pub created_at: NaiveDateTime,
    pub finalized_at: Option<NaiveDateTime>,
    pub dividend_round_id: Option<String>,
}

impl DividendComputation {
    pub fn is_finalized(&self) -> bool {
        self.dividend_round_id.is_some()
    }
}

/// Input model for persisting a computation together with its outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDividendComputation {
    pub company_id: String,
    pub total_amount_in_usd: Decimal,
    pub dividends_issuance_date: NaiveDate,
    pub return_of_capital: bool,
    pub outputs: Vec<ComputationOutput>,
}

/// A computation with its outputs and derived payouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendComputationDetails {
    pub computation: DividendComputation,
    pub outputs: Vec<ComputationOutput>,
    pub payouts: Vec<AllocationResult>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DividendStatus {
    Issued,
}

impl DividendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DividendStatus::Issued => "ISSUED",
        }
    }
}

impl FromStr for DividendStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ISSUED" => Ok(DividendStatus::Issued),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown dividend status '{}'",
                other
            )))),
        }
    }
}

/// A finalized, payable distribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DividendRound {
    pub id: String,
    pub company_id: String,
    pub issued_at: NaiveDate,
    pub number_of_shares: i64,
    pub number_of_shareholders: i64,
    pub total_amount_in_cents: i64,
    pub return_of_capital: bool,
    pub status: DividendStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDividendRound {
    pub company_id: String,
    pub issued_at: NaiveDate,
    pub number_of_shares: i64,
    pub number_of_shareholders: i64,
    pub total_amount_in_cents: i64,
    pub return_of_capital: bool,
}

/// One investor's payment within a dividend round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: String,
    pub company_id: String,
    pub dividend_round_id: String,
    pub company_investor_id: String,
    pub number_of_shares: Option<i64>,
    pub total_amount_in_cents: i64,
    pub qualified_amount_cents: i64,
    pub investment_amount_cents: i64,
    pub status: DividendStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDividend {
    pub company_investor_id: String,
    pub number_of_shares: Option<i64>,
    pub total_amount_in_cents: i64,
    pub qualified_amount_cents: i64,
    pub investment_amount_cents: i64,
}

/// Round plus payment records, as produced by `generate_distribution`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDistribution {
    pub round: NewDividendRound,
    pub dividends: Vec<NewDividend>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendRoundWithDividends {
    pub round: DividendRound,
    pub dividends: Vec<Dividend>,
}

/// The tabular exports available for a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportVariant {
    /// One row per (payee, share class) computation output.
    BySecurity,
    /// One row per aggregated payee.
    ByInvestor,
    /// One row per payout that finalization would create.
    FinalCreationList,
}

impl ExportVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportVariant::BySecurity => "by-security",
            ExportVariant::ByInvestor => "by-investor",
            ExportVariant::FinalCreationList => "final",
        }
    }

    pub fn file_name(&self, computation_id: &str) -> String {
        format!("dividend_computation_{}_{}.csv", computation_id, self.as_str())
    }
}

impl fmt::Display for ExportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "by-security" => Ok(ExportVariant::BySecurity),
            "by-investor" => Ok(ExportVariant::ByInvestor),
            "final" => Ok(ExportVariant::FinalCreationList),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown export variant '{}'",
                other
            )))),
        }
    }
}

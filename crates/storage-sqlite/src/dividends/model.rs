//! Database models for dividend computations and rounds.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flexile_core::dividends::{
    ComputationOutput, Dividend, DividendComputation, DividendRound, DividendStatus, PayeeRef,
};
use flexile_core::errors::{Error, Result, ValidationError};

fn parse_decimal(value: &str, field_name: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        log::error!("Stored {} '{}' is not a decimal: {}", field_name, value, e);
        Error::from(ValidationError::DecimalParse(e))
    })
}

#[derive(
    Queryable, Selectable, Insertable, Identifiable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::dividend_computations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DividendComputationDB {
    pub id: String,
    pub company_id: String,
    pub total_amount_in_usd: String,
    pub dividends_issuance_date: NaiveDate,
    pub return_of_capital: bool,
    pub dividend_round_id: Option<String>,
    pub finalized_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<DividendComputationDB> for DividendComputation {
    type Error = Error;

    fn try_from(db: DividendComputationDB) -> Result<Self> {
        Ok(Self {
            total_amount_in_usd: parse_decimal(&db.total_amount_in_usd, "total_amount_in_usd")?,
            id: db.id,
            company_id: db.company_id,
            dividends_issuance_date: db.dividends_issuance_date,
            return_of_capital: db.return_of_capital,
            created_at: db.created_at,
            finalized_at: db.finalized_at,
            dividend_round_id: db.dividend_round_id,
        })
    }
}

/// One stored output row. `position` keeps the generator's row order.
#[derive(Queryable, Selectable, Insertable, Identifiable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::dividend_computation_outputs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DividendComputationOutputDB {
    pub id: String,
    pub dividend_computation_id: String,
    pub position: i32,
    pub company_investor_id: Option<String>,
    pub investor_name: Option<String>,
    pub share_class: String,
    pub number_of_shares: i64,
    pub preferred_dividend_amount_in_usd: String,
    pub dividend_amount_in_usd: String,
    pub total_amount_in_usd: String,
    pub qualified_dividend_amount_usd: String,
    pub investment_amount_cents: Option<i64>,
}

impl DividendComputationOutputDB {
    pub fn from_domain(
        id: String,
        dividend_computation_id: String,
        position: i32,
        output: ComputationOutput,
    ) -> Self {
        let (company_investor_id, investor_name) = match output.payee {
            PayeeRef::Investor(investor_id) => (Some(investor_id), None),
            PayeeRef::SafeHolder(name) => (None, Some(name)),
        };
        Self {
            id,
            dividend_computation_id,
            position,
            company_investor_id,
            investor_name,
            share_class: output.share_class,
            number_of_shares: output.number_of_shares,
            preferred_dividend_amount_in_usd: output.preferred_dividend_amount_in_usd.to_string(),
            dividend_amount_in_usd: output.dividend_amount_in_usd.to_string(),
            total_amount_in_usd: output.total_amount_in_usd.to_string(),
            qualified_dividend_amount_usd: output.qualified_dividend_amount_usd.to_string(),
            investment_amount_cents: output.investment_amount_cents,
        }
    }
}

impl TryFrom<DividendComputationOutputDB> for ComputationOutput {
    type Error = Error;

    fn try_from(db: DividendComputationOutputDB) -> Result<Self> {
        Ok(Self {
            payee: PayeeRef::from_parts(db.company_investor_id, db.investor_name)?,
            preferred_dividend_amount_in_usd: parse_decimal(
                &db.preferred_dividend_amount_in_usd,
                "preferred_dividend_amount_in_usd",
            )?,
            dividend_amount_in_usd: parse_decimal(
                &db.dividend_amount_in_usd,
                "dividend_amount_in_usd",
            )?,
            total_amount_in_usd: parse_decimal(&db.total_amount_in_usd, "total_amount_in_usd")?,
            qualified_dividend_amount_usd: parse_decimal(
                &db.qualified_dividend_amount_usd,
                "qualified_dividend_amount_usd",
            )?,
            share_class: db.share_class,
            number_of_shares: db.number_of_shares,
            investment_amount_cents: db.investment_amount_cents,
        })
    }
}

#[derive(
    Queryable, Selectable, Insertable, Identifiable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::dividend_rounds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DividendRoundDB {
    pub id: String,
    pub company_id: String,
    pub issued_at: NaiveDate,
    pub number_of_shares: i64,
    pub number_of_shareholders: i64,
    pub total_amount_in_cents: i64,
    pub return_of_capital: bool,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<DividendRoundDB> for DividendRound {
    type Error = Error;

    fn try_from(db: DividendRoundDB) -> Result<Self> {
        Ok(Self {
            status: DividendStatus::from_str(&db.status)?,
            id: db.id,
            company_id: db.company_id,
            issued_at: db.issued_at,
            number_of_shares: db.number_of_shares,
            number_of_shareholders: db.number_of_shareholders,
            total_amount_in_cents: db.total_amount_in_cents,
            return_of_capital: db.return_of_capital,
            created_at: db.created_at,
        })
    }
}

#[derive(
    Queryable,
    Selectable,
    Insertable,
    Identifiable,
    Associations,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(DividendRoundDB, foreign_key = dividend_round_id))]
#[diesel(table_name = crate::schema::dividends)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DividendDB {
    pub id: String,
    pub company_id: String,
    pub dividend_round_id: String,
    pub company_investor_id: String,
    pub number_of_shares: Option<i64>,
    pub total_amount_in_cents: i64,
    pub qualified_amount_cents: i64,
    pub investment_amount_cents: i64,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<DividendDB> for Dividend {
    type Error = Error;

    fn try_from(db: DividendDB) -> Result<Self> {
        Ok(Self {
            status: DividendStatus::from_str(&db.status)?,
            id: db.id,
            company_id: db.company_id,
            dividend_round_id: db.dividend_round_id,
            company_investor_id: db.company_investor_id,
            number_of_shares: db.number_of_shares,
            total_amount_in_cents: db.total_amount_in_cents,
            qualified_amount_cents: db.qualified_amount_cents,
            investment_amount_cents: db.investment_amount_cents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn safe_output() -> ComputationOutput {
        ComputationOutput {
            payee: PayeeRef::SafeHolder("Seed SAFE".to_string()),
            share_class: "Convertible".to_string(),
            number_of_shares: 250,
            preferred_dividend_amount_in_usd: Decimal::ZERO,
            dividend_amount_in_usd: dec!(125.50),
            total_amount_in_usd: dec!(125.50),
            qualified_dividend_amount_usd: Decimal::ZERO,
            investment_amount_cents: None,
        }
    }

    #[test]
    fn test_output_row_splits_payee_columns() {
        let row = DividendComputationOutputDB::from_domain(
            "o-1".to_string(),
            "c-1".to_string(),
            3,
            safe_output(),
        );
        assert_eq!(row.company_investor_id, None);
        assert_eq!(row.investor_name.as_deref(), Some("Seed SAFE"));
        assert_eq!(row.total_amount_in_usd, "125.50");

        let back = ComputationOutput::try_from(row).unwrap();
        assert_eq!(back, safe_output());
    }

    #[test]
    fn test_output_row_with_both_payee_columns_is_rejected() {
        let mut row = DividendComputationOutputDB::from_domain(
            "o-1".to_string(),
            "c-1".to_string(),
            0,
            safe_output(),
        );
        row.company_investor_id = Some("inv-1".to_string());
        assert!(ComputationOutput::try_from(row).is_err());
    }

    #[test]
    fn test_unknown_round_status_is_rejected() {
        let round = DividendRoundDB {
            id: "r-1".to_string(),
            company_id: "company-1".to_string(),
            issued_at: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            number_of_shares: 0,
            number_of_shareholders: 0,
            total_amount_in_cents: 0,
            return_of_capital: false,
            status: "VOID".to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        assert!(DividendRound::try_from(round).is_err());
    }
}

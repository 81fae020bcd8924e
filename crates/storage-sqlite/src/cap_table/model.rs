//! Database models for the cap table.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flexile_core::cap_table::{
    CompanyInvestor, ConvertibleInvestment, ConvertibleSecurity, ShareClass, ShareHolding,
};
use flexile_core::errors::{Result, ValidationError};

fn parse_optional_decimal(value: Option<&str>, field_name: &str) -> Result<Option<Decimal>> {
    value
        .map(|v| {
            Decimal::from_str(v).map_err(|e| {
                log::error!("Stored {} '{}' is not a decimal: {}", field_name, v, e);
                flexile_core::Error::from(ValidationError::DecimalParse(e))
            })
        })
        .transpose()
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::company_investors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CompanyInvestorDB {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl From<CompanyInvestorDB> for CompanyInvestor {
    fn from(db: CompanyInvestorDB) -> Self {
        Self {
            id: db.id,
            company_id: db.company_id,
            name: db.name,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::share_classes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ShareClassDB {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub original_issue_price_in_dollars: Option<String>,
    pub preferred_dividend_rate: Option<String>,
    pub hurdle_rate: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ShareClassDB> for ShareClass {
    type Error = flexile_core::Error;

    fn try_from(db: ShareClassDB) -> Result<Self> {
        Ok(Self {
            original_issue_price_in_dollars: parse_optional_decimal(
                db.original_issue_price_in_dollars.as_deref(),
                "original_issue_price_in_dollars",
            )?,
            preferred_dividend_rate: parse_optional_decimal(
                db.preferred_dividend_rate.as_deref(),
                "preferred_dividend_rate",
            )?,
            hurdle_rate: parse_optional_decimal(db.hurdle_rate.as_deref(), "hurdle_rate")?,
            id: db.id,
            company_id: db.company_id,
            name: db.name,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::share_holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ShareHoldingDB {
    pub id: String,
    pub company_id: String,
    pub company_investor_id: String,
    pub share_class_id: String,
    pub number_of_shares: i64,
    pub total_amount_in_cents: i64,
    pub originally_acquired_at: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl From<ShareHoldingDB> for ShareHolding {
    fn from(db: ShareHoldingDB) -> Self {
        Self {
            id: db.id,
            company_id: db.company_id,
            company_investor_id: db.company_investor_id,
            share_class_id: db.share_class_id,
            number_of_shares: db.number_of_shares,
            total_amount_in_cents: db.total_amount_in_cents,
            originally_acquired_at: db.originally_acquired_at,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::convertible_investments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ConvertibleInvestmentDB {
    pub id: String,
    pub company_id: String,
    pub entity_name: String,
    pub amount_in_cents: i64,
    pub implied_shares: i64,
    pub issued_at: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl ConvertibleInvestmentDB {
    /// Builds the domain investment together with its securities.
    pub fn into_domain(self, securities: Vec<ConvertibleSecurity>) -> ConvertibleInvestment {
        ConvertibleInvestment {
            id: self.id,
            company_id: self.company_id,
            entity_name: self.entity_name,
            amount_in_cents: self.amount_in_cents,
            implied_shares: self.implied_shares,
            issued_at: self.issued_at,
            convertible_securities: securities,
        }
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
#[diesel(belongs_to(ConvertibleInvestmentDB, foreign_key = convertible_investment_id))]
#[diesel(table_name = crate::schema::convertible_securities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ConvertibleSecurityDB {
    pub id: String,
    pub convertible_investment_id: String,
    pub company_investor_id: String,
    pub principal_value_in_cents: i64,
    pub created_at: NaiveDateTime,
}

impl From<ConvertibleSecurityDB> for ConvertibleSecurity {
    fn from(db: ConvertibleSecurityDB) -> Self {
        Self {
            id: db.id,
            convertible_investment_id: db.convertible_investment_id,
            company_investor_id: db.company_investor_id,
            principal_value_in_cents: db.principal_value_in_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share_class_db(rate: Option<&str>) -> ShareClassDB {
        ShareClassDB {
            id: "sc-1".to_string(),
            company_id: "company-1".to_string(),
            name: "Series A".to_string(),
            original_issue_price_in_dollars: Some("1.50".to_string()),
            preferred_dividend_rate: rate.map(str::to_string),
            hurdle_rate: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_share_class_decimals_parse() {
        let class = ShareClass::try_from(share_class_db(Some("0.08"))).unwrap();
        assert_eq!(class.original_issue_price_in_dollars, Some(Decimal::new(150, 2)));
        assert_eq!(class.preferred_dividend_rate, Some(Decimal::new(8, 2)));
        assert_eq!(class.hurdle_rate, None);
    }

    #[test]
    fn test_share_class_rejects_corrupt_decimal() {
        assert!(ShareClass::try_from(share_class_db(Some("eight percent"))).is_err());
    }
}

//! Cap table domain models.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// An investor registered on a company's cap table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInvestor {
    pub id: String,
    pub company_id: String,
    pub name: String,
}

/// A class of shares, optionally carrying a preferred dividend entitlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareClass {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub original_issue_price_in_dollars: Option<Decimal>,
    /// Annual preferred dividend as a fraction of the original issue price.
    pub preferred_dividend_rate: Option<Decimal>,
    pub hurdle_rate: Option<Decimal>,
}

impl ShareClass {
    /// Preferred dividend owed per share, when the class has one.
    pub fn preferred_dividend_per_share(&self) -> Option<Decimal> {
        match (self.original_issue_price_in_dollars, self.preferred_dividend_rate) {
            (Some(price), Some(rate)) if price > Decimal::ZERO && rate > Decimal::ZERO => {
                Some(price * rate)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareHolding {
    pub id: String,
    pub company_id: String,
    pub company_investor_id: String,
    pub share_class_id: String,
    pub number_of_shares: i64,
    /// Capital paid for the holding.
    pub total_amount_in_cents: i64,
    pub originally_acquired_at: NaiveDate,
}

/// A security held by one investor under a convertible investment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertibleSecurity {
    pub id: String,
    pub convertible_investment_id: String,
    pub company_investor_id: String,
    pub principal_value_in_cents: i64,
}

/// A SAFE-style investment recorded against an entity name rather than a
/// registered shareholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertibleInvestment {
    pub id: String,
    pub company_id: String,
    pub entity_name: String,
    pub amount_in_cents: i64,
    /// Shares the investment would convert into; used for per-share dividends.
    pub implied_shares: i64,
    pub issued_at: NaiveDate,
    pub convertible_securities: Vec<ConvertibleSecurity>,
}

impl ConvertibleInvestment {
    pub fn principal_total_in_cents(&self) -> i64 {
        self.convertible_securities
            .iter()
            .map(|s| s.principal_value_in_cents)
            .sum()
    }
}

/// Everything the dividend computation needs to know about a company.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapTable {
    pub company_id: String,
    pub investors: Vec<CompanyInvestor>,
    pub share_classes: Vec<ShareClass>,
    pub share_holdings: Vec<ShareHolding>,
    pub convertible_investments: Vec<ConvertibleInvestment>,
}

impl CapTable {
    pub fn investor_names(&self) -> HashMap<String, String> {
        self.investors
            .iter()
            .map(|i| (i.id.clone(), i.name.clone()))
            .collect()
    }

    pub fn share_classes_by_id(&self) -> HashMap<&str, &ShareClass> {
        self.share_classes
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect()
    }

    pub fn find_convertible_by_entity_name(
        &self,
        entity_name: &str,
    ) -> Option<&ConvertibleInvestment> {
        self.convertible_investments
            .iter()
            .find(|c| c.entity_name == entity_name)
    }

    pub fn total_shares(&self) -> i64 {
        self.share_holdings.iter().map(|h| h.number_of_shares).sum()
    }
}

/// Input model for registering an investor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyInvestor {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShareClass {
    pub id: Option<String>,
    pub name: String,
    pub original_issue_price_in_dollars: Option<Decimal>,
    pub preferred_dividend_rate: Option<Decimal>,
    pub hurdle_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShareHolding {
    pub id: Option<String>,
    pub company_investor_id: String,
    pub share_class_id: String,
    pub number_of_shares: i64,
    pub total_amount_in_cents: i64,
    pub originally_acquired_at: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConvertibleSecurity {
    pub id: Option<String>,
    pub company_investor_id: String,
    pub principal_value_in_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConvertibleInvestment {
    pub id: Option<String>,
    pub entity_name: String,
    pub amount_in_cents: i64,
    pub implied_shares: i64,
    pub issued_at: NaiveDate,
    #[serde(default)]
    pub convertible_securities: Vec<NewConvertibleSecurity>,
}

/// A batch of cap table records to add to a company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapTableImport {
    #[serde(default)]
    pub investors: Vec<NewCompanyInvestor>,
    #[serde(default)]
    pub share_classes: Vec<NewShareClass>,
    #[serde(default)]
    pub share_holdings: Vec<NewShareHolding>,
    #[serde(default)]
    pub convertible_investments: Vec<NewConvertibleInvestment>,
}

impl CapTableImport {
    pub fn validate(&self) -> Result<()> {
        for investor in &self.investors {
            if investor.name.trim().is_empty() {
                return Err(ValidationError::MissingField("investor name".to_string()).into());
            }
        }
        for class in &self.share_classes {
            if class.name.trim().is_empty() {
                return Err(ValidationError::MissingField("share class name".to_string()).into());
            }
            if class.preferred_dividend_rate.is_some_and(|r| r < Decimal::ZERO) {
                return Err(ValidationError::InvalidInput(format!(
                    "Share class '{}' has a negative preferred dividend rate",
                    class.name
                ))
                .into());
            }
        }
        for holding in &self.share_holdings {
            if holding.number_of_shares < 0 || holding.total_amount_in_cents < 0 {
                return Err(ValidationError::InvalidInput(format!(
                    "Share holding for investor {} must not be negative",
                    holding.company_investor_id
                ))
                .into());
            }
        }
        for investment in &self.convertible_investments {
            if investment.entity_name.trim().is_empty() {
                return Err(
                    ValidationError::MissingField("convertible entity name".to_string()).into(),
                );
            }
            if investment.amount_in_cents <= 0 {
                return Err(ValidationError::InvalidInput(format!(
                    "Convertible investment '{}' must have a positive amount",
                    investment.entity_name
                ))
                .into());
            }
            if investment.implied_shares < 0 {
                return Err(ValidationError::InvalidInput(format!(
                    "Convertible investment '{}' has negative implied shares",
                    investment.entity_name
                ))
                .into());
            }
            if investment
                .convertible_securities
                .iter()
                .any(|s| s.principal_value_in_cents < 0)
            {
                return Err(ValidationError::InvalidInput(format!(
                    "Convertible investment '{}' has a negative security principal",
                    investment.entity_name
                ))
                .into());
            }
            if investment.convertible_securities.is_empty() {
                return Err(ValidationError::InvalidInput(format!(
                    "Convertible investment '{}' has no securities",
                    investment.entity_name
                ))
                .into());
            }
            let principal_total: i64 = investment
                .convertible_securities
                .iter()
                .map(|s| s.principal_value_in_cents)
                .sum();
            if principal_total != investment.amount_in_cents {
                return Err(ValidationError::InvalidInput(format!(
                    "Convertible investment '{}' securities add up to {} cents, expected {}",
                    investment.entity_name, principal_total, investment.amount_in_cents
                ))
                .into());
            }
        }
        Ok(())
    }
}

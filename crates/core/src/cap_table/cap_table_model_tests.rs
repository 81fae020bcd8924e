//! Tests for cap table domain models.

use super::*;
use crate::errors::{Error, ValidationError};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn share_class(price: Option<rust_decimal::Decimal>, rate: Option<rust_decimal::Decimal>) -> ShareClass {
    ShareClass {
        id: "class-a".to_string(),
        company_id: "company-1".to_string(),
        name: "Series A Preferred".to_string(),
        original_issue_price_in_dollars: price,
        preferred_dividend_rate: rate,
        hurdle_rate: None,
    }
}

fn new_investment(amount_in_cents: i64) -> NewConvertibleInvestment {
    NewConvertibleInvestment {
        id: None,
        entity_name: "Acme Ventures SAFE".to_string(),
        amount_in_cents,
        implied_shares: 500,
        issued_at: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        convertible_securities: vec![NewConvertibleSecurity {
            id: None,
            company_investor_id: "investor-1".to_string(),
            principal_value_in_cents: amount_in_cents,
        }],
    }
}

#[test]
fn test_preferred_dividend_per_share() {
    assert_eq!(
        share_class(Some(dec!(1.50)), Some(dec!(0.06))).preferred_dividend_per_share(),
        Some(dec!(0.09))
    );
    assert_eq!(share_class(Some(dec!(1.50)), None).preferred_dividend_per_share(), None);
    assert_eq!(share_class(None, Some(dec!(0.06))).preferred_dividend_per_share(), None);
    assert_eq!(
        share_class(Some(dec!(1.50)), Some(dec!(0))).preferred_dividend_per_share(),
        None
    );
}

#[test]
fn test_find_convertible_by_entity_name() {
    let cap_table = CapTable {
        company_id: "company-1".to_string(),
        convertible_investments: vec![ConvertibleInvestment {
            id: "ci-1".to_string(),
            company_id: "company-1".to_string(),
            entity_name: "Acme Ventures SAFE".to_string(),
            amount_in_cents: 10_000,
            implied_shares: 100,
            issued_at: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            convertible_securities: vec![],
        }],
        ..Default::default()
    };

    assert!(cap_table
        .find_convertible_by_entity_name("Acme Ventures SAFE")
        .is_some());
    assert!(cap_table.find_convertible_by_entity_name("Unknown").is_none());
}

#[test]
fn test_import_validation_accepts_well_formed_batch() {
    let import = CapTableImport {
        investors: vec![NewCompanyInvestor {
            id: Some("investor-1".to_string()),
            name: "Jane Founder".to_string(),
        }],
        convertible_investments: vec![new_investment(100_000)],
        ..Default::default()
    };
    assert!(import.validate().is_ok());
}

#[test]
fn test_import_validation_rejects_zero_convertible_amount() {
    let import = CapTableImport {
        convertible_investments: vec![new_investment(0)],
        ..Default::default()
    };
    assert!(import.validate().is_err());
}

#[test]
fn test_import_validation_rejects_negative_shares() {
    let import = CapTableImport {
        share_holdings: vec![NewShareHolding {
            id: None,
            company_investor_id: "investor-1".to_string(),
            share_class_id: "class-a".to_string(),
            number_of_shares: -1,
            total_amount_in_cents: 0,
            originally_acquired_at: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }],
        ..Default::default()
    };
    assert!(import.validate().is_err());
}

#[test]
fn test_import_validation_rejects_blank_investor_name() {
    let import = CapTableImport {
        investors: vec![NewCompanyInvestor {
            id: None,
            name: "  ".to_string(),
        }],
        ..Default::default()
    };
    assert!(import.validate().is_err());
}

#[test]
fn test_import_validation_rejects_convertible_without_securities() {
    let mut investment = new_investment(10_000);
    investment.convertible_securities.clear();
    let import = CapTableImport {
        convertible_investments: vec![investment],
        ..Default::default()
    };
    assert!(matches!(
        import.validate(),
        Err(Error::Validation(ValidationError::InvalidInput(_)))
    ));
}

#[test]
fn test_import_validation_rejects_unbalanced_principals() {
    let mut investment = new_investment(10_000);
    investment.convertible_securities[0].principal_value_in_cents = 6_000;
    let import = CapTableImport {
        convertible_investments: vec![investment],
        ..Default::default()
    };
    assert!(matches!(
        import.validate(),
        Err(Error::Validation(ValidationError::InvalidInput(_)))
    ));
}

#[test]
fn test_principal_total_sums_securities() {
    let investment = ConvertibleInvestment {
        id: "ci-1".to_string(),
        company_id: "company-1".to_string(),
        entity_name: "Acme Ventures SAFE".to_string(),
        amount_in_cents: 10_000,
        implied_shares: 100,
        issued_at: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        convertible_securities: vec![
            ConvertibleSecurity {
                id: "cs-1".to_string(),
                convertible_investment_id: "ci-1".to_string(),
                company_investor_id: "investor-1".to_string(),
                principal_value_in_cents: 6_000,
            },
            ConvertibleSecurity {
                id: "cs-2".to_string(),
                convertible_investment_id: "ci-1".to_string(),
                company_investor_id: "investor-2".to_string(),
                principal_value_in_cents: 3_000,
            },
        ],
    };
    assert_eq!(investment.principal_total_in_cents(), 9_000);
}

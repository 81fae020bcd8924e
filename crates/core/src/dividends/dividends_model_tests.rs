//! Tests for dividend domain models.

#[cfg(test)]
mod tests {
    use crate::dividends::{
        DistributionRequest, DividendStatus, ExportVariant, PayeeRef,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_payee_ref_from_parts() {
        assert_eq!(
            PayeeRef::from_parts(Some("inv-1".to_string()), None).unwrap(),
            PayeeRef::Investor("inv-1".to_string())
        );
        assert_eq!(
            PayeeRef::from_parts(None, Some("Seed SAFE".to_string())).unwrap(),
            PayeeRef::SafeHolder("Seed SAFE".to_string())
        );
        assert!(PayeeRef::from_parts(None, None).is_err());
        assert!(PayeeRef::from_parts(Some("inv-1".to_string()), Some("x".to_string())).is_err());
    }

    #[test]
    fn test_payee_ref_serialization() {
        assert_eq!(
            serde_json::to_string(&PayeeRef::Investor("inv-1".to_string())).unwrap(),
            "{\"investor\":\"inv-1\"}"
        );
        assert_eq!(
            serde_json::to_string(&PayeeRef::SafeHolder("Seed".to_string())).unwrap(),
            "{\"safeHolder\":\"Seed\"}"
        );
    }

    #[test]
    fn test_distribution_request_deserializes_snake_case() {
        let request: DistributionRequest = serde_json::from_str(
            r#"{"amount_in_usd": 60000.0, "dividends_issuance_date": "2024-06-30", "return_of_capital": true}"#,
        )
        .unwrap();
        assert_eq!(request.amount_in_usd, dec!(60000));
        assert_eq!(
            request.dividends_issuance_date,
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
        );
        assert!(request.return_of_capital);
    }

    #[test]
    fn test_distribution_request_validation() {
        let mut request = DistributionRequest {
            amount_in_usd: dec!(1),
            dividends_issuance_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            return_of_capital: false,
        };
        assert!(request.validate().is_ok());
        request.amount_in_usd = dec!(0);
        assert!(request.validate().is_err());
        request.amount_in_usd = dec!(-5);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_export_variant_round_trip_names() {
        for variant in [
            ExportVariant::BySecurity,
            ExportVariant::ByInvestor,
            ExportVariant::FinalCreationList,
        ] {
            assert_eq!(ExportVariant::from_str(variant.as_str()).unwrap(), variant);
        }
        assert!(ExportVariant::from_str("pdf").is_err());
        assert_eq!(
            ExportVariant::ByInvestor.file_name("abc"),
            "dividend_computation_abc_by-investor.csv"
        );
    }

    #[test]
    fn test_dividend_status_strings() {
        assert_eq!(DividendStatus::Issued.as_str(), "ISSUED");
        assert_eq!(DividendStatus::from_str("ISSUED").unwrap(), DividendStatus::Issued);
        assert!(DividendStatus::from_str("VOID").is_err());
    }
}

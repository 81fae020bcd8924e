//! Property-based integration tests for the dividend allocation engine.

use chrono::NaiveDate;
use flexile_core::cap_table::{
    CapTable, ConvertibleInvestment, ConvertibleSecurity, ShareClass, ShareHolding,
};
use flexile_core::dividends::{
    aggregate, build_payouts, generate_computation_outputs, generate_distribution,
    ComputationOutput, DistributionRequest, PayeeRef,
};
use flexile_core::errors::{AllocationError, Error};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

/// Generates a USD amount between 0.01 and 10,000,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_output() -> impl Strategy<Value = ComputationOutput> {
    (
        prop_oneof![
            (0u8..5).prop_map(|i| PayeeRef::Investor(format!("inv-{}", i))),
            (0u8..3).prop_map(|i| PayeeRef::SafeHolder(format!("SAFE {}", i))),
        ],
        0i64..100_000,
        1i64..10_000_000,
        proptest::option::of(0i64..1_000_000),
    )
        .prop_map(|(payee, shares, cents, investment)| {
            let total = Decimal::new(cents, 2);
            ComputationOutput {
                payee,
                share_class: "Common".to_string(),
                number_of_shares: shares,
                preferred_dividend_amount_in_usd: Decimal::ZERO,
                dividend_amount_in_usd: total,
                total_amount_in_usd: total,
                qualified_dividend_amount_usd: total,
                investment_amount_cents: investment,
            }
        })
}

/// Generates a cap table with common holdings and SAFEs split across holders.
fn arb_cap_table() -> impl Strategy<Value = CapTable> {
    (
        proptest::collection::vec(1i64..1_000_000, 1..8),
        proptest::collection::vec(
            (1i64..100_000, proptest::collection::vec(1i64..5_000_000, 1..4)),
            0..3,
        ),
    )
        .prop_map(|(holdings, safes)| {
            let acquired = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            let share_holdings = holdings
                .iter()
                .enumerate()
                .map(|(i, shares)| ShareHolding {
                    id: format!("h-{}", i),
                    company_id: "company".to_string(),
                    company_investor_id: format!("inv-{}", i),
                    share_class_id: "common".to_string(),
                    number_of_shares: *shares,
                    total_amount_in_cents: 0,
                    originally_acquired_at: acquired,
                })
                .collect();
            let convertible_investments = safes
                .iter()
                .enumerate()
                .map(|(i, (implied_shares, principals))| ConvertibleInvestment {
                    id: format!("ci-{}", i),
                    company_id: "company".to_string(),
                    entity_name: format!("SAFE {}", i),
                    amount_in_cents: principals.iter().sum(),
                    implied_shares: *implied_shares,
                    issued_at: acquired,
                    convertible_securities: principals
                        .iter()
                        .enumerate()
                        .map(|(j, principal)| ConvertibleSecurity {
                            id: format!("cs-{}-{}", i, j),
                            convertible_investment_id: format!("ci-{}", i),
                            company_investor_id: format!("safe-inv-{}-{}", i, j),
                            principal_value_in_cents: *principal,
                        })
                        .collect(),
                })
                .collect();
            CapTable {
                company_id: "company".to_string(),
                investors: vec![],
                share_classes: vec![ShareClass {
                    id: "common".to_string(),
                    company_id: "company".to_string(),
                    name: "Common".to_string(),
                    original_issue_price_in_dollars: None,
                    preferred_dividend_rate: None,
                    hurdle_rate: None,
                }],
                share_holdings,
                convertible_investments,
            }
        })
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Permuting the outputs never changes the aggregated totals.
    #[test]
    fn prop_aggregate_is_order_independent(
        outputs in proptest::collection::vec(arb_output(), 0..30),
    ) {
        let mut reversed = outputs.clone();
        reversed.reverse();
        let mut rotated = outputs.clone();
        if !rotated.is_empty() {
            rotated.rotate_left(outputs.len() / 2);
        }

        let baseline = aggregate(&outputs);
        prop_assert_eq!(&baseline, &aggregate(&reversed));
        prop_assert_eq!(&baseline, &aggregate(&rotated));
    }

    /// Generated outputs add up to exactly the requested amount.
    #[test]
    fn prop_outputs_sum_to_requested_amount(
        amount in arb_amount(),
        cap_table in arb_cap_table(),
    ) {
        let request = DistributionRequest {
            amount_in_usd: amount,
            dividends_issuance_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            return_of_capital: false,
        };
        let outputs = generate_computation_outputs(&request, &cap_table).unwrap();
        let total: Decimal = outputs.iter().map(|o| o.total_amount_in_usd).sum();
        prop_assert_eq!(total, amount);
    }

    /// Payouts add up to the distribution total within one cent per
    /// SAFE-derived row.
    #[test]
    fn prop_payouts_sum_within_rounding_tolerance(
        amount in arb_amount(),
        cap_table in arb_cap_table(),
    ) {
        let request = DistributionRequest {
            amount_in_usd: amount,
            dividends_issuance_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            return_of_capital: false,
        };
        let outputs = generate_computation_outputs(&request, &cap_table).unwrap();
        let (shares, safes) = aggregate(&outputs);
        let payouts = build_payouts(&shares, &safes, &cap_table.convertible_investments).unwrap();

        let safe_rows = payouts.iter().filter(|p| p.number_of_shares.is_none()).count();
        let tolerance = Decimal::new(safe_rows as i64, 2);
        let allocated: Decimal = payouts.iter().map(|p| p.total_amount).sum();
        prop_assert!((allocated - amount).abs() <= tolerance);

        let distribution = generate_distribution(
            "company",
            amount,
            request.dividends_issuance_date,
            false,
            &payouts,
        )
        .unwrap();
        let expected_shares: i64 = cap_table.share_holdings.iter().map(|h| h.number_of_shares).sum();
        prop_assert_eq!(distribution.round.number_of_shares, expected_shares);
        prop_assert_eq!(distribution.dividends.len(), payouts.len());
    }

    /// A SAFE whose securities do not cover its amount is refused instead of
    /// silently dropping the uncovered share.
    #[test]
    fn prop_unbalanced_safe_is_rejected(
        amount in arb_amount(),
        cap_table in arb_cap_table(),
        skew in 1i64..1_000_000,
    ) {
        let mut cap_table = cap_table;
        prop_assume!(!cap_table.convertible_investments.is_empty());
        cap_table.convertible_investments[0].amount_in_cents += skew;

        let request = DistributionRequest {
            amount_in_usd: amount,
            dividends_issuance_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            return_of_capital: false,
        };
        let outputs = generate_computation_outputs(&request, &cap_table).unwrap();
        let (shares, safes) = aggregate(&outputs);
        prop_assume!(safes.contains_key("SAFE 0"));

        let result = build_payouts(&shares, &safes, &cap_table.convertible_investments);
        let rejected = matches!(
            result,
            Err(Error::Allocation(AllocationError::UnbalancedConvertibleInvestment { .. }))
        );
        prop_assert!(rejected);
    }
}

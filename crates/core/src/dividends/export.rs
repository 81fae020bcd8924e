//! CSV exports of a dividend computation.

use std::collections::HashMap;

use csv::Writer;

use super::allocation::{aggregate, build_payouts, SafeDividends, ShareDividends};
use super::dividends_model::{AllocationResult, ComputationOutput, ExportVariant, PayeeRef};
use crate::cap_table::ConvertibleInvestment;
use crate::errors::{Error, Result};
use crate::utils::decimal_utils::{cents_to_usd, format_usd};

pub const BY_SECURITY_HEADERS: [&str; 8] = [
    "Investor",
    "Share class",
    "Number of shares",
    "Preferred dividend (USD)",
    "Dividend (USD)",
    "Total amount (USD)",
    "Qualified dividend amount (USD)",
    "Investment amount (USD)",
];

pub const BY_INVESTOR_HEADERS: [&str; 6] = [
    "Investor",
    "Investor ID",
    "Number of shares",
    "Total amount (USD)",
    "Qualified dividend amount (USD)",
    "Investment amount (USD)",
];

pub const FINAL_CREATION_HEADERS: [&str; 6] = [
    "Company investor ID",
    "Investor",
    "Number of shares",
    "Total amount (USD)",
    "Qualified dividend amount (USD)",
    "Investment amount (cents)",
];

fn payee_display_name(payee: &PayeeRef, investor_names: &HashMap<String, String>) -> String {
    match payee {
        PayeeRef::Investor(id) => investor_names.get(id).cloned().unwrap_or_else(|| id.clone()),
        PayeeRef::SafeHolder(name) => name.clone(),
    }
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Export(e.to_string()))
}

/// One row per (payee, share class) computation output.
pub fn export_by_security(
    outputs: &[ComputationOutput],
    investor_names: &HashMap<String, String>,
) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(BY_SECURITY_HEADERS)?;

    for output in outputs {
        writer.write_record([
            payee_display_name(&output.payee, investor_names),
            output.share_class.clone(),
            output.number_of_shares.to_string(),
            format_usd(output.preferred_dividend_amount_in_usd),
            format_usd(output.dividend_amount_in_usd),
            format_usd(output.total_amount_in_usd),
            format_usd(output.qualified_dividend_amount_usd),
            output
                .investment_amount_cents
                .map(|cents| format_usd(cents_to_usd(cents)))
                .unwrap_or_default(),
        ])?;
    }

    finish(writer)
}

/// One row per aggregated payee: shareholders first, then SAFE holders.
pub fn export_by_investor(
    share_dividends: &ShareDividends,
    safe_dividends: &SafeDividends,
    investor_names: &HashMap<String, String>,
) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(BY_INVESTOR_HEADERS)?;

    for (investor_id, dividend) in share_dividends {
        writer.write_record([
            investor_names
                .get(investor_id)
                .cloned()
                .unwrap_or_else(|| investor_id.clone()),
            investor_id.clone(),
            dividend.number_of_shares.to_string(),
            format_usd(dividend.total_amount),
            format_usd(dividend.qualified_dividends_amount),
            format_usd(cents_to_usd(dividend.investment_amount_cents)),
        ])?;
    }

    for (entity_name, dividend) in safe_dividends {
        writer.write_record([
            entity_name.clone(),
            String::new(),
            dividend.number_of_shares.to_string(),
            format_usd(dividend.total_amount),
            format_usd(dividend.qualified_dividends_amount),
            format_usd(cents_to_usd(dividend.investment_amount_cents)),
        ])?;
    }

    finish(writer)
}

/// One row per payout that finalizing the computation would create.
pub fn export_final_creation_list(
    payouts: &[AllocationResult],
    investor_names: &HashMap<String, String>,
) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(FINAL_CREATION_HEADERS)?;

    for payout in payouts {
        writer.write_record([
            payout.company_investor_id.clone(),
            investor_names
                .get(&payout.company_investor_id)
                .cloned()
                .unwrap_or_default(),
            payout
                .number_of_shares
                .map(|n| n.to_string())
                .unwrap_or_default(),
            format_usd(payout.total_amount),
            format_usd(payout.qualified_dividends_amount),
            payout.investment_amount_cents.to_string(),
        ])?;
    }

    finish(writer)
}

/// Renders the requested export variant from a computation's outputs.
pub fn export_computation(
    variant: ExportVariant,
    outputs: &[ComputationOutput],
    convertible_investments: &[ConvertibleInvestment],
    investor_names: &HashMap<String, String>,
) -> Result<String> {
    match variant {
        ExportVariant::BySecurity => export_by_security(outputs, investor_names),
        ExportVariant::ByInvestor => {
            let (share_dividends, safe_dividends) = aggregate(outputs);
            export_by_investor(&share_dividends, &safe_dividends, investor_names)
        }
        ExportVariant::FinalCreationList => {
            let (share_dividends, safe_dividends) = aggregate(outputs);
            let payouts = build_payouts(&share_dividends, &safe_dividends, convertible_investments)?;
            export_final_creation_list(&payouts, investor_names)
        }
    }
}

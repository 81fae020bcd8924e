use rust_decimal::Decimal;

/// Decimal places kept on per-payee USD amounts
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Cents per US dollar
pub const CENTS_PER_DOLLAR: i64 = 100;

/// Minimum days a position must be held before the issuance date for its
/// dividends to count as qualified.
pub const QUALIFIED_HOLDING_PERIOD_DAYS: i64 = 60;

/// Payout drift (in USD) above which finalization logs a warning
pub const PAYOUT_DRIFT_WARNING_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

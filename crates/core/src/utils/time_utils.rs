use chrono::NaiveDate;

/// Number of whole days between acquisition and the reference date.
/// Negative when the position was acquired after the reference date.
pub fn days_held(acquired_on: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - acquired_on).num_days()
}

/// Returns true when a position acquired on `acquired_on` has been held for at
/// least `min_days` by `as_of`.
pub fn held_at_least(acquired_on: NaiveDate, as_of: NaiveDate, min_days: i64) -> bool {
    days_held(acquired_on, as_of) >= min_days
}

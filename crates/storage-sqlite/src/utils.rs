//! Helpers for batching SQLite statements.

/// Upper bound on bound parameters per statement.
///
/// SQLite builds compiled with the historical default reject statements
/// carrying more than 999 variables.
pub const SQLITE_MAX_PARAMS: usize = 999;

/// Number of rows of `columns` bound values that fit in one multi-row insert.
pub fn insert_batch_size(columns: usize) -> usize {
    (SQLITE_MAX_PARAMS / columns.max(1)).max(1)
}

/// Splits `ids` into slices small enough for a single `IN (...)` clause.
pub fn chunk_ids<T>(ids: &[T]) -> impl Iterator<Item = &[T]> {
    ids.chunks(SQLITE_MAX_PARAMS / 2)
}

/// Inclusive range of `x` for which `x + delta` fits in an `i64`.
///
/// Bound into guarded UPDATEs so SQLite never promotes an overflowing
/// INTEGER column to REAL.
pub fn add_range(delta: i64) -> (i64, i64) {
    if delta >= 0 {
        (i64::MIN, i64::MAX - delta)
    } else {
        (i64::MIN - delta, i64::MAX)
    }
}

//! Clock access for store operations.

/// Current unix time in seconds. Collection saves and legacy migration stamp
/// templates with this when no timestamp is present.
pub(crate) fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for report times.
pub type Timestamp = DateTime<Utc>;

/// Convert a Tuya `t` field (milliseconds since the Unix epoch).
///
/// Returns `None` for values outside chrono's representable range.
#[must_use]
pub fn from_millis(millis: i64) -> Option<Timestamp> {
    DateTime::from_timestamp_millis(millis)
}

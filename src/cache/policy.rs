//! Freshness policy for cached feeds

use chrono::{DateTime, Days, Utc};

/// Number of calendar days a cached feed stays valid
pub const MAX_CACHE_AGE_DAYS: u64 = 7;

/// Decides whether a cache timestamp is still fresh
///
/// Day arithmetic is done on the UTC calendar, so the result does not depend
/// on the local timezone of the process.
pub struct CachePolicy;

impl CachePolicy {
    /// Returns `true` if `now` is strictly earlier than `timestamp` plus the
    /// maximum cache age.
    ///
    /// A timestamp in the future is valid. If adding the maximum age
    /// overflows the calendar, the timestamp is reported invalid.
    pub fn validate(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match timestamp.checked_add_days(Days::new(MAX_CACHE_AGE_DAYS)) {
            Some(max_age) => now < max_age,
            None => false,
        }
    }
}

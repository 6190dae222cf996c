//! Common utilities shared across modules.

use chrono::Utc;

/// Current UTC time in milliseconds since UNIX_EPOCH.
///
/// Used as the index build timestamp.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

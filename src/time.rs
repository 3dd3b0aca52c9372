//! Microsecond epoch timestamps used throughout the pipeline's delay
//! arithmetic (`now_micros` appears in every `firstHopSentTime` /
//! `secondHopSentTime` / `thirdHopSentTime` capture.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as microseconds since the Unix epoch.
pub fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

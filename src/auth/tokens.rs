use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use rand::Rng;

use crate::error::AppError;

const TOKEN_BYTES: usize = 32;

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// `now + minutes`. Spans chrono cannot represent are rejected.
pub fn expires_after(minutes: i64) -> Result<DateTime<FixedOffset>, AppError> {
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .map(|at| at.fixed_offset())
        .ok_or_else(|| AppError::bad_request(format!("link expiry of {minutes} minutes is out of range")))
}

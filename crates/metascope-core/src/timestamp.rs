//! Hybrid logical timestamps.
//!
//! The cluster packs a millisecond wall-clock reading and an 18-bit logical
//! counter into one `u64`: `physical_ms << 18 | logical`.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{CoreError, CoreResult};

pub const LOGICAL_BITS: u32 = 18;
pub const LOGICAL_MASK: u64 = (1 << LOGICAL_BITS) - 1;

/// Splits a hybrid timestamp into its physical time and logical counter.
///
/// # Errors
///
/// Returns `InvalidArgument` when the physical part is outside chrono's range.
pub fn parse_ts(ts: u64) -> CoreResult<(DateTime<Utc>, u64)> {
    let logical = ts & LOGICAL_MASK;
    let physical_ms = i64::try_from(ts >> LOGICAL_BITS)
        .map_err(|_| CoreError::invalid_argument(format!("timestamp {ts} out of range")))?;
    let physical = Utc
        .timestamp_millis_opt(physical_ms)
        .single()
        .ok_or_else(|| CoreError::invalid_argument(format!("timestamp {ts} out of range")))?;
    Ok((physical, logical))
}

/// Packs a wall-clock time and logical counter into a hybrid timestamp.
#[must_use]
pub fn compose_ts(physical: DateTime<Utc>, logical: u64) -> u64 {
    let physical_ms = u64::try_from(physical.timestamp_millis()).unwrap_or(0);
    (physical_ms << LOGICAL_BITS) | (logical & LOGICAL_MASK)
}

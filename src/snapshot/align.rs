use chrono::{DateTime, TimeDelta, Timelike as _, Utc};

use crate::foundation::core::SnapshotTime;

/// Compute the snapshot a run should request.
///
/// `now - lag_minutes`, with the minute field floored to a multiple of `granularity_minutes`
/// and seconds/sub-seconds zeroed. Providers only publish on that grid, after a delay.
///
/// `granularity_minutes` is clamped to `1..=60`; [`crate::Config`] rejects anything else.
pub fn align_snapshot(
    now: DateTime<Utc>,
    lag_minutes: u32,
    granularity_minutes: u32,
) -> SnapshotTime {
    let granularity = granularity_minutes.clamp(1, 60);
    let target = now - TimeDelta::minutes(i64::from(lag_minutes));

    let excess_minutes = target.minute() % granularity;
    let aligned = target
        - TimeDelta::minutes(i64::from(excess_minutes))
        - TimeDelta::seconds(i64::from(target.second()))
        - TimeDelta::nanoseconds(i64::from(target.nanosecond()));

    SnapshotTime::from_aligned(aligned)
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/align.rs"]
mod tests;

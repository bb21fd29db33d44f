use chrono::{DateTime, Datelike, Utc};

use crate::prelude::{CoreError, CoreResult, DAY_US, HOUR_US, MINUTE_US};

pub struct TimeHelper;

impl TimeHelper {
    fn to_utc(ts_us: i64) -> CoreResult<DateTime<Utc>> {
        DateTime::from_timestamp_micros(ts_us).ok_or(CoreError::InvalidTimestamp(ts_us))
    }

    /// Formats a microsecond timestamp as zero-padded `HHMMZ`.
    pub fn zulu_hhmm(ts_us: i64) -> CoreResult<String> {
        Ok(Self::clock(Self::to_utc(ts_us)?))
    }

    /// Calendar year (UTC) of a microsecond timestamp.
    pub fn utc_year(ts_us: i64) -> CoreResult<i32> {
        Ok(Self::to_utc(ts_us)?.year())
    }

    /// Wall-clock display in the same `HHMMZ` form.
    pub fn clock(now: DateTime<Utc>) -> String {
        now.format("%H%MZ").to_string()
    }

    pub fn now_us() -> i64 {
        Utc::now().timestamp_micros()
    }

    /// Bucketed age: `<1m`, `Nm`, `Nh`, or `1d+`.
    pub fn time_ago(now_us: i64, then_us: i64) -> String {
        let delta = now_us.saturating_sub(then_us);
        if delta < MINUTE_US {
            "<1m".to_string()
        } else if delta < HOUR_US {
            format!("{}m", delta / MINUTE_US)
        } else if delta < DAY_US {
            format!("{}h", delta / HOUR_US)
        } else {
            "1d+".to_string()
        }
    }
}

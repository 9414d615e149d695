use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone};

use crate::error::{Error, Result};

/// Wall-clock time of day of `instant` as seen at `offset`.
pub fn time_of_day<Tz: TimeZone>(instant: &DateTime<Tz>, offset: FixedOffset) -> NaiveTime {
    instant.with_timezone(&offset).time()
}

pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| Error::Config(config::ConfigError::Message(format!("UTC offset out of range: {} minutes", minutes))))
}

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date as midnight UTC.
pub fn parse_day(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let day = NaiveDate::parse_from_str(s, DAY_FORMAT)?;
    Ok(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Server timestamp at the resolution Postgres keeps for `TIMESTAMPTZ`.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

//! Timestamp handling and the clock seam.
//!
//! The API accepts two encodings: an ISO-8601 string with a `±HHMM` offset
//! (order queries, market hours, option chains) and epoch milliseconds (price
//! history bounds only). A `Timestamp` remembers whether the caller supplied
//! an offset so naive values can be rendered with `+0000`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A point in time, with or without an explicit UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl Timestamp {
    /// `0001-01-01T00:00:00`, the lower bound used when an order query has no
    /// start time.
    pub fn earliest() -> Self {
        let date = NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN);
        Timestamp::Naive(date.and_time(NaiveTime::default()))
    }

    /// Render as `YYYY-MM-DDTHH:MM:SS±HHMM`. Naive values get `+0000`.
    pub fn to_iso_string(&self) -> String {
        match self {
            Timestamp::Naive(dt) => format!("{}+0000", dt.format(ISO_FORMAT)),
            Timestamp::Offset(dt) => dt.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
        }
    }

    /// Milliseconds since the Unix epoch. Naive values are read as UTC.
    pub fn to_epoch_millis(&self) -> i64 {
        match self {
            Timestamp::Naive(dt) => dt.and_utc().timestamp_millis(),
            Timestamp::Offset(dt) => dt.timestamp_millis(),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Timestamp::Naive(dt)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Timestamp::Naive(date.and_time(NaiveTime::default()))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        let offset = dt.offset().fix();
        Timestamp::Offset(dt.with_timezone(&offset))
    }
}

/// Source of the current instant for default upper time bounds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads the system clock on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from(Utc::now())
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn naive_timestamp_gets_utc_offset() {
        let ts = Timestamp::from(naive(2020, 3, 14, 9, 26, 53));
        assert_eq!(ts.to_iso_string(), "2020-03-14T09:26:53+0000");
    }

    #[test]
    fn offset_timestamp_keeps_its_offset() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let ts = Timestamp::from(tz.from_local_datetime(&naive(2020, 3, 14, 9, 26, 53)).unwrap());
        assert_eq!(ts.to_iso_string(), "2020-03-14T09:26:53-0500");
    }

    #[test]
    fn half_hour_offset_is_preserved() {
        let tz = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let ts = Timestamp::from(tz.from_local_datetime(&naive(2021, 1, 2, 3, 4, 5)).unwrap());
        assert_eq!(ts.to_iso_string(), "2021-01-02T03:04:05+0530");
    }

    #[test]
    fn utc_datetime_formats_with_zero_offset() {
        let ts = Timestamp::from(Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 59).unwrap());
        assert_eq!(ts.to_iso_string(), "2019-12-31T23:59:59+0000");
    }

    #[test]
    fn earliest_is_year_one() {
        assert_eq!(Timestamp::earliest().to_iso_string(), "0001-01-01T00:00:00+0000");
    }

    #[test]
    fn date_only_is_midnight() {
        let ts = Timestamp::from(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(ts.to_iso_string(), "2020-06-01T00:00:00+0000");
    }

    #[test]
    fn epoch_millis_for_naive_is_utc() {
        let ts = Timestamp::from(naive(1970, 1, 1, 0, 0, 1));
        assert_eq!(ts.to_epoch_millis(), 1000);
    }

    #[test]
    fn epoch_millis_accounts_for_offset() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let ts = Timestamp::from(tz.from_local_datetime(&naive(1970, 1, 1, 1, 0, 0)).unwrap());
        assert_eq!(ts.to_epoch_millis(), 0);
    }

    #[test]
    fn fixed_clock_returns_its_instant() {
        let ts = Timestamp::from(naive(2022, 2, 2, 2, 2, 2));
        assert_eq!(FixedClock(ts).now(), ts);
    }
}

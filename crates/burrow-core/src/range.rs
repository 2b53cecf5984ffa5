use crate::error::CoreError;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::Timestamp;

/// Truncates a timestamp to its calendar date in UTC.
///
/// All analytics bucketing goes through this function so that the grouping
/// does not depend on the time zone of the host.
pub fn utc_date(ts: Timestamp) -> Date {
    ts.to_zoned(TimeZone::UTC).date()
}

/// A half-open `[start, end)` time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    /// Creates a range from explicit timestamps. `end` is exclusive.
    ///
    /// `start == end` is accepted and yields an empty range.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering whole UTC calendar days, `end` inclusive.
    ///
    /// The exclusive upper bound is midnight (UTC) of the day after `end`.
    pub fn from_dates(start: Date, end: Date) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidRange(format!(
                "start date {start} is after end date {end}"
            )));
        }

        let start_ts = start_of_day(start)?;
        let day_after = end
            .tomorrow()
            .map_err(|e| CoreError::InvalidRange(format!("end date {end} out of range: {e}")))?;
        let end_ts = start_of_day(day_after)?;

        Self::new(start_ts, end_ts)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts < self.end
    }
}

fn start_of_day(date: Date) -> Result<Timestamp, CoreError> {
    date.to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|e| CoreError::InvalidRange(format!("date {date} out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn utc_date_ignores_offset_of_input() {
        // 23:30 at -05:00 is already the next day in UTC.
        assert_eq!(utc_date(ts("2024-05-01T23:30:00-05:00")), date(2024, 5, 2));
        assert_eq!(utc_date(ts("2024-05-01T00:00:00Z")), date(2024, 5, 1));
    }

    #[test]
    fn end_is_exclusive() {
        let range = TimeRange::new(ts("2024-05-01T00:00:00Z"), ts("2024-05-02T00:00:00Z")).unwrap();
        assert!(range.contains(ts("2024-05-01T00:00:00Z")));
        assert!(range.contains(ts("2024-05-01T23:59:59.999Z")));
        assert!(!range.contains(ts("2024-05-02T00:00:00Z")));
    }

    #[test]
    fn empty_range_contains_nothing() {
        let at = ts("2024-05-01T12:00:00Z");
        let range = TimeRange::new(at, at).unwrap();
        assert!(!range.contains(at));
    }

    #[test]
    fn rejects_reversed_range() {
        let err = TimeRange::new(ts("2024-05-02T00:00:00Z"), ts("2024-05-01T00:00:00Z"));
        assert!(matches!(err, Err(CoreError::InvalidRange(_))));
    }

    #[test]
    fn from_dates_makes_end_date_inclusive() {
        let range = TimeRange::from_dates(date(2024, 5, 1), date(2024, 5, 1)).unwrap();
        assert_eq!(range.start(), ts("2024-05-01T00:00:00Z"));
        assert_eq!(range.end(), ts("2024-05-02T00:00:00Z"));
        assert!(range.contains(ts("2024-05-01T23:59:59Z")));
    }

    #[test]
    fn from_dates_crosses_month_boundary() {
        let range = TimeRange::from_dates(date(2024, 2, 28), date(2024, 2, 29)).unwrap();
        assert_eq!(range.end(), ts("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn from_dates_rejects_reversed_dates() {
        assert!(TimeRange::from_dates(date(2024, 5, 2), date(2024, 5, 1)).is_err());
    }
}

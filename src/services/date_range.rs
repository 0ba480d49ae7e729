//! Default date window for timeseries requests.
//!
//! Dates are serialized the way browsers print `Date#toISOString`: UTC with
//! millisecond precision and a `Z` suffix. The default start is computed on
//! the calendar of the server's local timezone.

use chrono::{
    DateTime, Days, Duration, FixedOffset, Local, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeZone, Utc,
};

/// Days subtracted from today's local midnight for the default start date.
pub const DEFAULT_WINDOW_DAYS: u64 = 29;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    /// Keeps supplied bounds untouched and fills each missing one on its own.
    pub fn resolve<Tz: TimeZone>(
        start_date: Option<String>,
        end_date: Option<String>,
        now: &DateTime<Tz>,
    ) -> Self {
        let end_date = end_date.unwrap_or_else(|| to_iso_string(now));
        let start_date = start_date.unwrap_or_else(|| to_iso_string(&one_month_ago(now)));

        Self {
            start_date,
            end_date,
        }
    }
}

pub fn to_iso_string<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's midnight in `now`'s timezone, moved back 29 calendar days with
/// its wall-clock time kept.
pub fn one_month_ago<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let midnight = resolve_local(&tz, now.date_naive().and_time(NaiveTime::MIN));

    let target = midnight
        .naive_local()
        .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
        .unwrap_or(NaiveDateTime::MIN);

    resolve_local(&tz, target)
}

// A local time inside a DST gap resolves to the first valid instant an hour later.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

/// Source of "now" for default date ranges.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Wall clock in the server's local timezone.
    #[default]
    System,
    /// Frozen instant, its offset standing in for the local timezone.
    Fixed(DateTime<FixedOffset>),
}

impl Clock {
    pub fn resolve_range(&self, start_date: Option<String>, end_date: Option<String>) -> DateRange {
        match self {
            Clock::System => DateRange::resolve(start_date, end_date, &Local::now()),
            Clock::Fixed(now) => DateRange::resolve(start_date, end_date, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{LocalResult, NaiveDate};

    /// Zone at UTC-4 that springs forward to UTC-3 at local midnight on
    /// 2024-03-10, so 00:00..01:00 that day never happens.
    #[derive(Debug, Clone, Copy)]
    struct MidnightDstZone;

    impl MidnightDstZone {
        fn switch_local() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_time(NaiveTime::MIN)
        }

        fn standard() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for MidnightDstZone {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            MidnightDstZone
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let switch = Self::switch_local();
            if *local < switch {
                LocalResult::Single(Self::standard())
            } else if *local < switch + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch_local() + Duration::hours(4) {
                Self::standard()
            } else {
                Self::summer()
            }
        }
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn defaults_both_bounds_from_now() {
        let range = DateRange::resolve(None, None, &at("2024-03-15T14:30:00Z"));

        assert_eq!(range.end_date, "2024-03-15T14:30:00.000Z");
        assert_eq!(range.start_date, "2024-02-15T00:00:00.000Z");
    }

    #[test]
    fn keeps_supplied_bounds_verbatim() {
        let range = DateRange::resolve(
            Some("2023-01-01".to_string()),
            Some("2023-01-31T10:00:00+02:00".to_string()),
            &at("2024-03-15T14:30:00Z"),
        );

        assert_eq!(range.start_date, "2023-01-01");
        assert_eq!(range.end_date, "2023-01-31T10:00:00+02:00");
    }

    #[test]
    fn bounds_default_independently() {
        let now = at("2024-03-15T14:30:00Z");

        let only_start = DateRange::resolve(Some("2024-01-01".to_string()), None, &now);
        assert_eq!(only_start.start_date, "2024-01-01");
        assert_eq!(only_start.end_date, "2024-03-15T14:30:00.000Z");

        let only_end = DateRange::resolve(None, Some("2024-03-01".to_string()), &now);
        assert_eq!(only_end.start_date, "2024-02-15T00:00:00.000Z");
        assert_eq!(only_end.end_date, "2024-03-01");
    }

    #[test]
    fn start_uses_local_midnight_not_utc_midnight() {
        // 01:30 in Paris is still the previous day in UTC.
        let range = DateRange::resolve(None, None, &at("2024-03-15T01:30:00+01:00"));

        assert_eq!(range.end_date, "2024-03-15T00:30:00.000Z");
        assert_eq!(range.start_date, "2024-02-14T23:00:00.000Z");
    }

    #[test]
    fn window_crosses_month_and_year_boundaries() {
        let start = one_month_ago(&at("2025-01-10T08:00:00Z"));
        assert_eq!(to_iso_string(&start), "2024-12-12T00:00:00.000Z");
    }

    #[test]
    fn fixed_clock_resolves_against_its_instant() {
        let clock = Clock::Fixed(at("2024-03-15T14:30:00Z"));
        let range = clock.resolve_range(None, None);

        assert_eq!(range.end_date, "2024-03-15T14:30:00.000Z");
        assert_eq!(range.start_date, "2024-02-15T00:00:00.000Z");
    }

    #[test]
    fn system_clock_produces_iso_strings() {
        let range = Clock::System.resolve_range(None, None);

        assert!(range.end_date.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&range.start_date).is_ok());
        assert!(range.start_date < range.end_date);
    }

    #[test]
    fn midnight_in_dst_gap_keeps_one_am_on_target_day() {
        // 15:00 local on the day midnight was skipped.
        let now = MidnightDstZone.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
        );

        let start = one_month_ago(&now);

        assert_eq!(
            start.naive_local(),
            NaiveDate::from_ymd_opt(2024, 2, 10)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        );
        assert_eq!(to_iso_string(&start), "2024-02-10T05:00:00.000Z");
    }
}

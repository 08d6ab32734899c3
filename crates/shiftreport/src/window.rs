//! Rolling night-shift report window.
//!
//! The report always covers the previous calendar day at 18:00 through the
//! current calendar day at 06:00, in the site's local timezone. The site zone
//! is modeled as a fixed UTC offset; the reference deployment (+07:00) has no
//! daylight saving, so the offset is exact year-round.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Shift start wall-clock time on the previous day.
pub const SHIFT_START: &str = "18:00";

/// Shift end wall-clock time on the current day.
pub const SHIFT_END: &str = "06:00";

/// Default site offset: UTC+7 (Indochina Time).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// The date range the report query is filled with.
///
/// Invariant: `start_date` is exactly one calendar day before `end_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportWindow {
    /// Computes the window for the current instant in the given site offset.
    pub fn for_now(offset: FixedOffset) -> Self {
        Self::at(Utc::now().with_timezone(&offset))
    }

    /// Computes the window for an explicit instant.
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        let end_date = now.date_naive();
        Self {
            start_date: end_date - Duration::days(1),
            end_date,
        }
    }

    /// `"YYYY-MM-DD 18:00"`, the value typed into the range-start input.
    pub fn start_field(&self) -> String {
        format!("{} {}", self.start_date.format("%Y-%m-%d"), SHIFT_START)
    }

    /// `"YYYY-MM-DD 06:00"`, the value typed into the range-end input.
    pub fn end_field(&self) -> String {
        format!("{} {}", self.end_date.format("%Y-%m-%d"), SHIFT_END)
    }
}

/// Builds a `FixedOffset` east of UTC from whole hours.
///
/// Falls back to the default site offset when the hour count is out of the
/// representable range.
pub fn site_offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600)
        .unwrap_or_else(|| FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bangkok() -> FixedOffset {
        site_offset(7)
    }

    #[test]
    fn test_reference_scenario() {
        // 2024-03-15 08:00 Bangkok time, shortly after the shift ended.
        let now = bangkok().with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        let window = ReportWindow::at(now);

        assert_eq!(window.start_field(), "2024-03-14 18:00");
        assert_eq!(window.end_field(), "2024-03-15 06:00");
    }

    #[test]
    fn test_start_is_one_day_before_end() {
        for (y, m, d) in [(2024, 1, 1), (2024, 3, 1), (2025, 12, 31), (2023, 7, 15)] {
            let now = bangkok().with_ymd_and_hms(y, m, d, 6, 30, 0).unwrap();
            let window = ReportWindow::at(now);
            assert_eq!(window.start_date + Duration::days(1), window.end_date);
        }
    }

    #[test]
    fn test_month_and_leap_year_boundary() {
        let now = bangkok().with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap();
        let window = ReportWindow::at(now);
        // 2024 is a leap year
        assert_eq!(window.start_field(), "2024-02-29 18:00");
        assert_eq!(window.end_field(), "2024-03-01 06:00");

        let now = bangkok().with_ymd_and_hms(2025, 1, 1, 7, 0, 0).unwrap();
        let window = ReportWindow::at(now);
        assert_eq!(window.start_field(), "2024-12-31 18:00");
    }

    #[test]
    fn test_window_uses_site_date_not_utc_date() {
        // 23:30 UTC on the 14th is already 06:30 on the 15th in Bangkok.
        let utc = Utc.with_ymd_and_hms(2024, 3, 14, 23, 30, 0).unwrap();
        let window = ReportWindow::at(utc.with_timezone(&bangkok()));
        assert_eq!(window.end_field(), "2024-03-15 06:00");
    }

    #[test]
    fn test_site_offset_out_of_range_falls_back() {
        let offset = site_offset(99);
        assert_eq!(offset, site_offset(DEFAULT_UTC_OFFSET_HOURS));
    }
}

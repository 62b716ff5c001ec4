//! Support desk opening hours: Monday to Friday, 10:00 to 19:00 Tbilisi time (UTC+4).

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};

const UTC_OFFSET_SECONDS: i32 = 4 * 60 * 60;
const OPENING_HOUR: u32 = 10;
const CLOSING_HOUR: u32 = 19;

pub fn is_business_hours(now: DateTime<Utc>) -> bool {
    let Some(offset) = FixedOffset::east_opt(UTC_OFFSET_SECONDS) else {
        return false;
    };
    let local = now.with_timezone(&offset);

    let weekday = !matches!(local.weekday(), Weekday::Sat | Weekday::Sun);
    weekday && (OPENING_HOUR..CLOSING_HOUR).contains(&local.hour())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_weekday_afternoon_is_open() {
        // Wednesday 14:00 in Tbilisi
        assert!(is_business_hours(utc(2025, 3, 5, 10, 0)));
    }

    #[test]
    fn test_weekday_evening_is_closed() {
        // Wednesday 22:00 in Tbilisi
        assert!(!is_business_hours(utc(2025, 3, 5, 18, 0)));
    }

    #[test]
    fn test_saturday_is_closed() {
        // Saturday 14:00 in Tbilisi
        assert!(!is_business_hours(utc(2025, 3, 8, 10, 0)));
    }

    #[test]
    fn test_window_is_half_open() {
        assert!(!is_business_hours(utc(2025, 3, 5, 5, 59)));
        assert!(is_business_hours(utc(2025, 3, 5, 6, 0)));
        assert!(is_business_hours(utc(2025, 3, 5, 14, 59)));
        assert!(!is_business_hours(utc(2025, 3, 5, 15, 0)));
    }

    #[test]
    fn test_friday_and_monday_edges() {
        // Friday 18:30 local
        assert!(is_business_hours(utc(2025, 3, 7, 14, 30)));
        // Monday 10:00 local
        assert!(is_business_hours(utc(2025, 3, 3, 6, 0)));
        // Sunday 18:00 local
        assert!(!is_business_hours(utc(2025, 3, 9, 14, 0)));
    }
}

//! 时间工具函数: 业务时区转换
//!
//! Order numbers restart every business day. The day is the calendar date in
//! the configured timezone, kept as `YYYY-MM-DD` so it sorts as text.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析业务时区 (IANA name)
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::validation(format!("Unknown timezone: {}", name)))
}

/// Business day of an instant
pub fn business_day_at(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).date_naive().format("%Y-%m-%d").to_string()
}

/// Current business day
pub fn business_day(tz: Tz) -> String {
    business_day_at(Utc::now(), tz)
}

/// Validate and normalize an optional date filter
pub fn normalize_day(date: Option<&str>) -> AppResult<Option<String>> {
    date.map(|d| parse_date(d.trim()).map(|d| d.format("%Y-%m-%d").to_string()))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_business_day_follows_timezone() {
        // 2024-03-10 23:30 UTC is already the 11th in Madrid
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        assert_eq!(business_day_at(instant, chrono_tz::UTC), "2024-03-10");
        assert_eq!(business_day_at(instant, chrono_tz::Europe::Madrid), "2024-03-11");
        assert_eq!(business_day_at(instant, chrono_tz::America::New_York), "2024-03-10");
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Madrid").unwrap(), chrono_tz::Europe::Madrid);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_normalize_day() {
        assert_eq!(normalize_day(None).unwrap(), None);
        assert_eq!(
            normalize_day(Some(" 2024-01-05 ")).unwrap().as_deref(),
            Some("2024-01-05")
        );
        assert!(normalize_day(Some("01/05/2024")).is_err());
    }
}

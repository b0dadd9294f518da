//! Lenient date/datetime parsing and validation.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// Validate and normalize a date answer for `ASK_DATE`.
///
/// Returns `Some("YYYY-MM-DD")` on success, `None` for an empty string, a
/// digit-free non-relative term, unparseable text, or an invalid calendar
/// date.
pub fn validate_date(raw: &str) -> Option<String> {
    validate_date_at(raw, Utc::now())
}

pub fn validate_date_at(raw: &str, now: DateTime<Utc>) -> Option<String> {
    parse_lenient_date(raw, now).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Validate and normalize a datetime answer for `ASK_DATETIME`.
///
/// Returns `Some("YYYY-MM-DDTHH:MM:SS")` on success.
pub fn validate_datetime(raw: &str) -> Option<String> {
    validate_datetime_at(raw, Utc::now())
}

pub fn validate_datetime_at(raw: &str, now: DateTime<Utc>) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = resolve_relative(trimmed, now.date_naive()) {
        return Some(date.and_hms_opt(0, 0, 0).unwrap().format("%Y-%m-%dT%H:%M:%S").to_string());
    }
    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    dtparse::parse(trimmed)
        .ok()
        .map(|(naive, _offset)| naive.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn parse_lenient_date(raw: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = resolve_relative(trimmed, now.date_naive()) {
        return Some(date);
    }
    // "asdf" and friends never get this far in a valid date — catch them
    // before handing off to dtparse, which otherwise happily extracts a
    // spurious date from today's clock for pure garbage input.
    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    dtparse::parse(trimmed).ok().map(|(naive, _offset)| naive.date())
}

/// Resolve digit-free relative terms: `today`, `tomorrow`, `yesterday`,
/// a bare weekday name (next occurrence on or after `today`), or `next
/// <weekday>` (same occurrence, except when `today` itself is that weekday,
/// in which case it rolls over to the following week).
fn resolve_relative(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = raw.trim().to_ascii_lowercase();
    match lower.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    let (strictly_next_week, rest) = match lower.strip_prefix("next ") {
        Some(r) => (true, r),
        None => (false, lower.as_str()),
    };

    let weekday = parse_weekday(rest)?;
    let today_wd = today.weekday().num_days_from_monday() as i64;
    let target_wd = weekday.num_days_from_monday() as i64;
    let mut delta = (target_wd - today_wd).rem_euclid(7);
    if delta == 0 && strictly_next_week {
        delta = 7;
    }
    Some(today + Duration::days(delta))
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// `{lat, lng}` location validation.
pub fn validate_location(value: &serde_json::Value) -> Option<(f64, f64)> {
    let lat = value
        .get("lat")
        .or_else(|| value.get("latitude"))
        .and_then(|v| v.as_f64())?;
    let lng = value
        .get("lng")
        .or_else(|| value.get("lon"))
        .or_else(|| value.get("longitude"))
        .and_then(|v| v.as_f64())?;
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Some((lat, lng))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        // A Wednesday: 2026-03-04.
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn normalizes_short_iso_date() {
        assert_eq!(validate_date("2026-1-5"), Some("2026-01-05".to_string()));
    }

    #[test]
    fn normalizes_natural_language_date() {
        assert_eq!(validate_date("January 5, 2026"), Some("2026-01-05".to_string()));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(validate_date("asdf"), None);
    }

    #[test]
    fn rejects_invalid_calendar_date() {
        assert_eq!(validate_date("0000-13-40"), None);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(validate_date(""), None);
        assert_eq!(validate_date("   "), None);
    }

    #[test]
    fn resolves_today_and_tomorrow() {
        let now = fixed_now();
        assert_eq!(validate_date_at("today", now), Some("2026-03-04".to_string()));
        assert_eq!(validate_date_at("tomorrow", now), Some("2026-03-05".to_string()));
    }

    #[test]
    fn resolves_next_weekday() {
        // "today" is Wednesday 2026-03-04; "next Monday" should be 2026-03-09.
        let now = fixed_now();
        assert_eq!(validate_date_at("next Monday", now), Some("2026-03-09".to_string()));
    }

    #[test]
    fn datetime_normalizes_with_time_component() {
        let v = validate_datetime("2026-03-01 14:30").unwrap();
        assert_eq!(v, "2026-03-01T14:30:00");
    }

    #[test]
    fn location_accepts_in_range_pair() {
        let v = serde_json::json!({"lat": 24.7, "lng": 46.6});
        assert_eq!(validate_location(&v), Some((24.7, 46.6)));
    }

    #[test]
    fn location_rejects_out_of_range() {
        let v = serde_json::json!({"lat": 120.0, "lng": 46.6});
        assert_eq!(validate_location(&v), None);
    }
}

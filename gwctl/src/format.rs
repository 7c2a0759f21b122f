//! Display formatting for table cells and cards.
//!
//! All formatters are total: a missing value renders as `-` instead of failing.

use chrono::NaiveDateTime;

use crate::api::models::{WIRE_DATETIME_FORMAT, parse_timestamp};

/// Placeholder rendered for missing values.
pub const MISSING: &str = "-";

/// `95.0%`, one decimal.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.1}%"),
        _ => MISSING.to_string(),
    }
}

/// Whole milliseconds below one second, seconds with one decimal above.
pub fn format_latency(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => {
            if value < 1000.0 {
                format!("{}ms", value.round() as i64)
            } else {
                format!("{:.1}s", value / 1000.0)
            }
        }
        _ => MISSING.to_string(),
    }
}

/// Coarse "time since" label, floored to whole minutes.
///
/// Timestamps in the future are treated as "just now".
pub fn format_relative_time(value: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    let Some(then) = value else {
        return MISSING.to_string();
    };

    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return ago(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return ago(hours, "hour");
    }

    ago(hours / 24, "day")
}

fn ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Thousands-separated rendering of a count: `1234567` becomes `1,234,567`.
pub fn format_number<T: ToString>(value: Option<T>) -> String {
    let Some(value) = value else {
        return MISSING.to_string();
    };

    let raw = value.to_string();
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Per-unit cost in yuan, four decimals.
pub fn format_cost(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("¥{value:.4}"),
        _ => MISSING.to_string(),
    }
}

/// `YYYY-MM-DD HH:mm:ss`, the format the backend expects in request bodies.
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(WIRE_DATETIME_FORMAT).to_string()
}

/// Display form of an optional decoded timestamp.
pub fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    value.as_ref().map(format_datetime).unwrap_or_else(|| MISSING.to_string())
}

/// Normalise a raw timestamp string for display.
///
/// Anything [`parse_timestamp`] understands is re-rendered as `YYYY-MM-DD HH:mm:ss`.
/// Unparseable input is returned unchanged; blank input renders as `-`.
pub fn format_display_datetime(raw: &str) -> String {
    if raw.trim().is_empty() {
        return MISSING.to_string();
    }
    parse_timestamp(raw)
        .map(|ts| format_datetime(&ts))
        .unwrap_or_else(|| raw.to_string())
}

/// Approximate queries per second from a per-minute call count.
pub fn calculate_qps(recent_calls: Option<i64>) -> i64 {
    match recent_calls {
        Some(calls) if calls > 0 => (calls as f64 / 60.0).round() as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn percentages() {
        assert_eq!(format_percentage(None), "-");
        assert_eq!(format_percentage(Some(95.0)), "95.0%");
        assert_eq!(format_percentage(Some(99.94)), "99.9%");
        assert_eq!(format_percentage(Some(f64::NAN)), "-");
    }

    #[test]
    fn latencies() {
        assert_eq!(format_latency(None), "-");
        assert_eq!(format_latency(Some(999.0)), "999ms");
        assert_eq!(format_latency(Some(12.4)), "12ms");
        assert_eq!(format_latency(Some(1500.0)), "1.5s");
        assert_eq!(format_latency(Some(1000.0)), "1.0s");
    }

    #[test]
    fn relative_times() {
        let now = at(12, 0);
        assert_eq!(format_relative_time(None, now), "-");
        assert_eq!(format_relative_time(Some(now - Duration::seconds(59)), now), "just now");
        assert_eq!(format_relative_time(Some(now + Duration::minutes(5)), now), "just now");
        assert_eq!(format_relative_time(Some(at(11, 59)), now), "1 minute ago");
        assert_eq!(format_relative_time(Some(at(11, 15)), now), "45 minutes ago");
        assert_eq!(format_relative_time(Some(at(9, 30)), now), "2 hours ago");
        assert_eq!(format_relative_time(Some(now - Duration::days(3)), now), "3 days ago");
    }

    #[test]
    fn numbers_and_costs() {
        assert_eq!(format_number::<u64>(None), "-");
        assert_eq!(format_number(Some(0)), "0");
        assert_eq!(format_number(Some(999)), "999");
        assert_eq!(format_number(Some(1_234_567u64)), "1,234,567");
        assert_eq!(format_number(Some(-12_345i64)), "-12,345");
        assert_eq!(format_number(Some(1234.5)), "1,234.5");

        assert_eq!(format_cost(None), "-");
        assert_eq!(format_cost(Some(0.0015)), "¥0.0015");
        assert_eq!(format_cost(Some(2.0)), "¥2.0000");
    }

    #[test]
    fn datetimes() {
        assert_eq!(format_datetime(&at(9, 5)), "2024-01-15 09:05:00");
        assert_eq!(format_timestamp(None), "-");
        assert_eq!(format_display_datetime("2024-01-15T09:05:00.000"), "2024-01-15 09:05:00");
        assert_eq!(format_display_datetime("not a date"), "not a date");
        assert_eq!(format_display_datetime(""), "-");
    }

    #[test]
    fn qps() {
        assert_eq!(calculate_qps(None), 0);
        assert_eq!(calculate_qps(Some(0)), 0);
        assert_eq!(calculate_qps(Some(29)), 0);
        assert_eq!(calculate_qps(Some(90)), 2);
        assert_eq!(calculate_qps(Some(600)), 10);
    }
}

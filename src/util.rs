// Parsing, calendar and formatting helpers.
//
// The loaders lean on these so the aggregation code only ever sees clean,
// typed values.
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Parse a CSV cell into a finite `f64`.
///
/// - Trims whitespace and strips thousands separators.
/// - Accepts exponent forms such as `1e-7`, which the CSV writer emits.
/// - Returns `None` for blank, unparseable or non-finite input.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative integer count; blank or invalid cells count as zero.
pub fn parse_count(s: Option<&str>) -> u64 {
    match parse_f64_safe(s) {
        Some(v) if v > 0.0 => v.round() as u64,
        _ => 0,
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    // Trend exports sometimes carry a midnight timestamp.
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Monday of the week containing `d`, or `None` past the calendar's edge.
pub fn week_start(d: NaiveDate) -> Option<NaiveDate> {
    d.checked_sub_signed(Duration::days(d.weekday().num_days_from_monday() as i64))
}

/// Sunday closing the week containing `d`, or `None` past the calendar's edge.
pub fn week_end(d: NaiveDate) -> Option<NaiveDate> {
    d.checked_add_signed(Duration::days(6 - d.weekday().num_days_from_monday() as i64))
}

/// Month label in the BlueSky export's format, e.g. `December 2025`.
pub fn month_label(d: NaiveDate) -> String {
    d.format("%B %Y").to_string()
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice; callers check emptiness when it matters.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `en` thousands separators, e.g. `1,234.50`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// File-name-safe form of a topic, e.g. `Sizewell C` -> `Sizewell_C`.
pub fn slug(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parse_f64_rejects_text_and_blanks() {
        assert_eq!(parse_f64_safe(Some(" 42 ")), Some(42.0));
        assert_eq!(parse_f64_safe(Some("1,250.5")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("1.5e1")), Some(15.0));
        assert_eq!(parse_f64_safe(Some("1e-7")), Some(1e-7));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_date_accepts_timestamps() {
        assert_eq!(parse_date_safe(Some("2024-07-04")), Some(d("2024-07-04")));
        assert_eq!(
            parse_date_safe(Some("2024-07-04 00:00:00")),
            Some(d("2024-07-04"))
        );
        assert_eq!(
            parse_date_safe(Some("2025-12-18T01:25:52.713Z")),
            Some(d("2025-12-18"))
        );
        assert_eq!(parse_date_safe(Some("04/07/2024")), None);
        assert_eq!(parse_date_safe(Some("2024-02-30")), None);
    }

    #[test]
    fn weeks_run_monday_to_sunday() {
        // 2024-07-04 is a Thursday.
        assert_eq!(week_start(d("2024-07-04")), Some(d("2024-07-01")));
        assert_eq!(week_end(d("2024-07-04")), Some(d("2024-07-07")));
        assert_eq!(week_start(d("2024-07-01")), Some(d("2024-07-01")));
        assert_eq!(week_end(d("2024-07-07")), Some(d("2024-07-07")));
    }

    #[test]
    fn weeks_past_calendar_edge_are_none() {
        // Both extremes fall on a Tuesday.
        assert_eq!(week_start(NaiveDate::MIN), None);
        assert_eq!(week_end(NaiveDate::MAX), None);
        assert_eq!(week_end(NaiveDate::MIN), NaiveDate::MIN.checked_add_days(chrono::Days::new(5)));
        let far = parse_date_safe(Some("+262143-12-31")).unwrap();
        assert_eq!(week_end(far), None);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(7.0, 0), "7");
        assert_eq!(format_int(9855), "9,855");
        assert_eq!(month_label(d("2025-12-18")), "December 2025");
        assert_eq!(slug("New Hospital Programme"), "New_Hospital_Programme");
        assert_eq!(parse_count(Some("12")), 12);
        assert_eq!(parse_count(Some("")), 0);
    }
}

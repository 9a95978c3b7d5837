//! Due date input.

use chrono::{Local, NaiveDate, TimeDelta};

/// Parse human-readable due date input.
///
/// Supports:
/// - "today", "tomorrow"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
///
/// Offsets that would leave chrono's date range give `None`.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return TimeDelta::try_days(days).and_then(|d| today.checked_add_signed(d));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return TimeDelta::try_weeks(weeks).and_then(|d| today.checked_add_signed(d));
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Date text as stored on a task: parsed input in `YYYY-MM-DD`, anything
/// unrecognised kept verbatim.
pub fn normalise_date(input: &str) -> String {
    match parse_due_input(input, Local::now().date_naive()) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_input() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        assert_eq!(parse_due_input("today", today), Some(today));
        assert_eq!(parse_due_input("Tomorrow", today), NaiveDate::from_ymd_opt(2024, 2, 28));
        assert_eq!(parse_due_input("in 3d", today), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_due_input("in 1w", today), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_due_input("2024-12-31", today), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(parse_due_input("someday", today), None);
    }

    #[test]
    fn test_normalise_keeps_unknown_text() {
        assert_eq!(normalise_date(" 2024-05-01 "), "2024-05-01");
        assert_eq!(normalise_date("after lunch"), "after lunch");
        assert_eq!(normalise_date(""), "");
    }

    #[test]
    fn test_out_of_range_offsets_are_kept_verbatim() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        assert_eq!(parse_due_input("in 100000000d", today), None);
        assert_eq!(parse_due_input("in 99999999999999w", today), None);
        assert_eq!(parse_due_input("in -100000000d", today), None);
        assert_eq!(parse_due_input("tomorrow", NaiveDate::MAX), None);
        assert_eq!(normalise_date("in 100000000d"), "in 100000000d");
        assert_eq!(normalise_date("in 99999999999999w"), "in 99999999999999w");
    }
}

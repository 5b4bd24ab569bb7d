use chrono::{Datelike, NaiveDate};

const PREFIX: &str = "KZN";

/// `KZN-yyyyMMdd-` for the given submission day.
pub fn day_prefix(date: NaiveDate) -> String {
    format!("{PREFIX}-{}-", date.format("%Y%m%d"))
}

/// Format a kaizen number; the sequence is zero-padded to three digits.
pub fn format_number(date: NaiveDate, seq: u32) -> String {
    format!("{}{seq:03}", day_prefix(date))
}

/// Sequence to use after `last`, the highest number already issued that day.
pub fn next_sequence(date: NaiveDate, last: Option<&str>) -> u32 {
    let prefix = day_prefix(date);
    last.and_then(|n| n.strip_prefix(prefix.as_str()))
        .and_then(|seq| seq.parse::<u32>().ok())
        .map(|seq| seq + 1)
        .unwrap_or(1)
}

/// Advisory lock key serializing allocation for one day.
pub fn lock_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_number_of_the_day() {
        let d = day(2025, 1, 1);
        assert_eq!(next_sequence(d, None), 1);
        assert_eq!(format_number(d, 1), "KZN-20250101-001");
    }

    #[test]
    fn sequence_continues_within_a_day() {
        let d = day(2025, 1, 1);
        assert_eq!(next_sequence(d, Some("KZN-20250101-041")), 42);
        assert_eq!(format_number(d, 42), "KZN-20250101-042");
    }

    #[test]
    fn sequence_restarts_on_a_new_day() {
        assert_eq!(next_sequence(day(2025, 1, 2), Some("KZN-20250101-007")), 1);
    }

    #[test]
    fn sequence_grows_past_three_digits() {
        let d = day(2025, 6, 30);
        assert_eq!(next_sequence(d, Some("KZN-20250630-999")), 1000);
        assert_eq!(format_number(d, 1000), "KZN-20250630-1000");
    }

    #[test]
    fn malformed_last_number_starts_over() {
        assert_eq!(next_sequence(day(2025, 1, 1), Some("KZN-20250101-abc")), 1);
    }

    #[test]
    fn lock_key_is_the_date_as_digits() {
        assert_eq!(lock_key(day(2025, 1, 10)), 20250110);
    }
}

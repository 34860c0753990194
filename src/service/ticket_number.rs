//! Hall-ticket number formatting: issue date, district code, padded sequence.

use chrono::NaiveDate;

/// Two-character district code: first and last characters of the trimmed
/// district name, uppercased. A single-character district repeats its letter;
/// a missing character falls back to `X` so the formatter stays total.
pub fn district_code(district: &str) -> String {
    let trimmed = district.trim();
    let mut code = String::new();
    match trimmed.chars().next() {
        Some(c) => code.extend(c.to_uppercase()),
        None => code.push('X'),
    }
    match trimmed.chars().next_back() {
        Some(c) => code.extend(c.to_uppercase()),
        None => code.push('X'),
    }
    code
}

/// `YYYYMMDD` + district code + sequence zero-padded to four digits.
/// Sequences past 9999 keep their full width instead of being truncated.
pub fn ticket_number(issue_date: NaiveDate, district: &str, sequence: i64) -> String {
    format!(
        "{}{}{:04}",
        issue_date.format("%Y%m%d"),
        district_code(district),
        sequence
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_date_code_and_padded_sequence() {
        assert_eq!(
            ticket_number(date(2024, 1, 15), "Hyderabad", 7),
            "20240115HD0007"
        );
    }

    #[test]
    fn same_inputs_always_give_the_same_number() {
        let a = ticket_number(date(2025, 12, 3), "Warangal", 42);
        let b = ticket_number(date(2025, 12, 3), "Warangal", 42);
        assert_eq!(a, b);
        assert_eq!(a, "20251203WL0042");
    }

    #[test]
    fn single_character_district_repeats_its_letter() {
        assert_eq!(district_code("k"), "KK");
    }

    #[test]
    fn blank_district_falls_back_to_placeholder() {
        assert_eq!(district_code(""), "XX");
        assert_eq!(district_code("   "), "XX");
    }

    #[test]
    fn long_sequences_are_not_truncated() {
        assert_eq!(
            ticket_number(date(2024, 1, 15), "Hyderabad", 12345),
            "20240115HD12345"
        );
    }

    #[test]
    fn colliding_district_codes_still_differ_by_sequence() {
        let d = date(2024, 1, 15);
        assert_eq!(district_code("Hyderabad"), district_code("Hansabad"));
        assert_ne!(
            ticket_number(d, "Hyderabad", 8),
            ticket_number(d, "Hansabad", 9)
        );
    }

    #[test]
    fn uppercasing_handles_non_ascii() {
        assert_eq!(district_code("ésta"), "ÉA");
    }
}

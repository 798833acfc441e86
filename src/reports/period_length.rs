//! Report period lengths
//!
//! A report window covers a number of whole months ending, by default, with
//! the current month.

use chrono::NaiveDate;

use crate::models::Month;

pub const LAST_QUARTER_PERIOD: u32 = 3;
pub const LAST_HALF_YEAR_PERIOD: u32 = 6;
pub const LAST_9_MONTHS_PERIOD: u32 = 9;
pub const LAST_YEAR_PERIOD: u32 = 12;

/// Longest report window, in months
pub const MAX_PERIOD_LENGTH: u32 = 1200;

/// Period lengths offered for selection, in months
pub const PERIOD_LENGTHS: [u32; 8] = [
    LAST_QUARTER_PERIOD,
    LAST_HALF_YEAR_PERIOD,
    LAST_9_MONTHS_PERIOD,
    LAST_YEAR_PERIOD,
    24,
    36,
    48,
    60,
];

/// Human-readable name of a period of `months` months
pub fn period_length_label(months: u32) -> String {
    match months {
        LAST_QUARTER_PERIOD => "Last quarter".to_string(),
        LAST_HALF_YEAR_PERIOD => "Last half year".to_string(),
        LAST_9_MONTHS_PERIOD => "Last 9 months".to_string(),
        LAST_YEAR_PERIOD => "Last year".to_string(),
        n if n < LAST_YEAR_PERIOD => format!("Last {} months", n),
        n => format!("Last {} years", n / LAST_YEAR_PERIOD),
    }
}

/// Whether a window of `length` months can be reported on
pub fn is_valid_period_length(length: u32) -> bool {
    (1..=MAX_PERIOD_LENGTH).contains(&length)
}

/// `length` brought into `1..=MAX_PERIOD_LENGTH`
pub fn clamp_period_length(length: u32) -> u32 {
    length.clamp(1, MAX_PERIOD_LENGTH)
}

/// First month of a `length`-month window whose last month contains `today`
///
/// `length` is clamped to `1..=MAX_PERIOD_LENGTH`.
pub fn default_start_period(length: u32, today: NaiveDate) -> Month {
    let back = i64::from(clamp_period_length(length)) - 1;
    Month::from_date(today).add_months(-back)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_start_period() {
        let today = date(2024, 3, 17);
        assert_eq!(default_start_period(12, today), Month::new(2023, 4).unwrap());
        assert_eq!(default_start_period(3, today), Month::new(2024, 1).unwrap());
        assert_eq!(default_start_period(1, today), Month::new(2024, 3).unwrap());
        assert_eq!(
            default_start_period(12, today).first_day(),
            date(2023, 4, 1)
        );
    }

    #[test]
    fn test_default_start_period_ends_on_current_month() {
        let today = date(2024, 1, 31);
        for length in 1..=60 {
            let start = default_start_period(length, today);
            assert_eq!(
                start.months_until(Month::from_date(today)),
                length as i64 - 1,
                "length {}",
                length
            );
            assert_eq!(start.first_day().format("%d").to_string(), "01");
        }
    }

    #[test]
    fn test_default_start_period_at_and_above_cap() {
        let today = date(2024, 3, 17);
        let current = Month::from_date(today);

        let at_cap = default_start_period(MAX_PERIOD_LENGTH, today);
        assert_eq!(at_cap, Month::new(1924, 4).unwrap());
        assert_eq!(at_cap.months_until(current), MAX_PERIOD_LENGTH as i64 - 1);

        for length in [MAX_PERIOD_LENGTH + 1, i32::MAX as u32 + 1, u32::MAX] {
            let start = default_start_period(length, today);
            assert!(start <= current, "length {} starts at {}", length, start);
            assert_eq!(start, at_cap);
        }
        assert_eq!(default_start_period(0, today), current);
    }

    #[test]
    fn test_period_length_bounds() {
        assert!(!is_valid_period_length(0));
        assert!(is_valid_period_length(1));
        assert!(is_valid_period_length(MAX_PERIOD_LENGTH));
        assert!(!is_valid_period_length(MAX_PERIOD_LENGTH + 1));
        assert_eq!(clamp_period_length(0), 1);
        assert_eq!(clamp_period_length(u32::MAX), MAX_PERIOD_LENGTH);
        assert!(PERIOD_LENGTHS.iter().all(|l| is_valid_period_length(*l)));
    }

    #[test]
    fn test_labels() {
        assert_eq!(period_length_label(3), "Last quarter");
        assert_eq!(period_length_label(6), "Last half year");
        assert_eq!(period_length_label(9), "Last 9 months");
        assert_eq!(period_length_label(12), "Last year");
        assert_eq!(period_length_label(5), "Last 5 months");
        assert_eq!(period_length_label(24), "Last 2 years");
        assert_eq!(period_length_label(18), "Last 1 years");
    }
}

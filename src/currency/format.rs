//! Currency formatting
//!
//! A currency may carry its own number pattern and separators. Patterns use a
//! small subset of the decimal-format syntax:
//!
//! * `#`, `0` and `,` in the integer part; the digits after the last comma set
//!   the group size, the digits between the last two commas the size of every
//!   further group (`#,##,##0.00` groups as `12,34,567.00`);
//! * anything before or after the number is a literal prefix or suffix, with
//!   `¤` standing for the currency symbol and single quotes removed;
//! * the fraction part is ignored, the currency's `decimals` wins.
//!
//! Stored separators are quoted strings such as `"' '"`. Only strings of at
//! least three characters are read (their second character is the
//! separator); anything shorter falls back to the default separator.

use crate::models::money::split_minor;
use crate::models::{Currency, Money};

/// Pattern used when a currency has none
pub const DEFAULT_NUMBER_FORMAT: &str = "#,##0.00";

/// Decimal separator used when a currency does not override it
pub const DEFAULT_DECIMAL_SEPARATOR: char = '.';

/// Grouping separator used when a currency does not override it
pub const DEFAULT_GROUP_SEPARATOR: char = ',';

const CURRENCY_SIGN: char = '¤';

/// Formatter derived from a currency's stored settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    prefix: String,
    suffix: String,
    symbol: String,
    decimals: u32,
    decimal_separator: char,
    group_separator: char,
    primary_group: usize,
    secondary_group: usize,
}

/// Build the formatter for `currency`
pub fn create_currency_format(currency: &Currency) -> CurrencyFormat {
    CurrencyFormat::new(currency)
}

impl CurrencyFormat {
    /// Build the formatter for `currency`
    pub fn new(currency: &Currency) -> Self {
        let pattern = currency
            .number_format
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_NUMBER_FORMAT);
        // Only the positive subpattern is used
        let pattern = pattern.split(';').next().unwrap_or(DEFAULT_NUMBER_FORMAT);

        let is_number_char = |c: char| matches!(c, '#' | '0' | ',' | '.');
        let (prefix, number, suffix) = match (pattern.find(is_number_char), pattern.rfind(is_number_char)) {
            (Some(start), Some(end)) => (&pattern[..start], &pattern[start..=end], &pattern[end + 1..]),
            _ => (pattern, "", ""),
        };

        let integer = number.split('.').next().unwrap_or("");
        let (primary_group, secondary_group) = group_sizes(integer);

        Self {
            prefix: literal(prefix, &currency.symbol),
            suffix: literal(suffix, &currency.symbol),
            symbol: currency.symbol.clone(),
            decimals: currency.decimals,
            decimal_separator: separator_or_default(
                currency.decimal_separator.as_deref(),
                DEFAULT_DECIMAL_SEPARATOR,
            ),
            group_separator: separator_or_default(
                currency.group_separator.as_deref(),
                DEFAULT_GROUP_SEPARATOR,
            ),
            primary_group,
            secondary_group,
        }
    }

    /// Fraction digits amounts are shown with
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn group_separator(&self) -> char {
        self.group_separator
    }

    /// Format an amount kept in minor units
    pub fn format(&self, amount: Money) -> String {
        self.format_minor(amount.minor())
    }

    /// Format a value in major units, rounded to the currency's decimals
    pub fn format_value(&self, value: f64) -> String {
        let scaled = (value * 10f64.powi(i32::try_from(self.decimals).unwrap_or(i32::MAX))).round();
        self.format_minor(scaled as i64)
    }

    /// Format an amount and append the symbol unless the pattern shows it
    pub fn format_with_symbol(&self, amount: Money) -> String {
        let text = self.format(amount);
        if self.symbol.is_empty() || self.prefix.contains(&self.symbol) || self.suffix.contains(&self.symbol)
        {
            text
        } else {
            format!("{} {}", text, self.symbol)
        }
    }

    fn format_minor(&self, minor: i64) -> String {
        let (whole, fraction) = split_minor(minor.unsigned_abs(), self.decimals);
        let whole = self.group(&whole.to_string());

        let mut out = String::new();
        if minor < 0 {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&whole);
        if self.decimals > 0 {
            out.push(self.decimal_separator);
            out.push_str(&format!(
                "{:0width$}",
                fraction,
                width = self.decimals as usize
            ));
        }
        out.push_str(&self.suffix);
        out
    }

    fn group(&self, digits: &str) -> String {
        if self.primary_group == 0 || digits.len() <= self.primary_group {
            return digits.to_string();
        }

        let mut groups = Vec::new();
        let (rest, last) = digits.split_at(digits.len() - self.primary_group);
        groups.push(last);
        let mut rest = rest;
        while rest.len() > self.secondary_group {
            let (head, tail) = rest.split_at(rest.len() - self.secondary_group);
            groups.push(tail);
            rest = head;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }

        groups.reverse();
        groups.join(&self.group_separator.to_string())
    }
}

/// Group sizes of an integer pattern such as `#,##,##0`; zero disables grouping
fn group_sizes(integer: &str) -> (usize, usize) {
    let parts: Vec<&str> = integer.split(',').collect();
    if parts.len() < 2 {
        return (0, 0);
    }

    let primary = parts[parts.len() - 1].len();
    let secondary = if parts.len() > 2 {
        parts[parts.len() - 2].len()
    } else {
        primary
    };

    if primary == 0 {
        (0, 0)
    } else {
        (primary, secondary.max(1))
    }
}

fn literal(text: &str, symbol: &str) -> String {
    text.replace('\'', "").replace(CURRENCY_SIGN, symbol)
}

/// The separator a stored value stands for
///
/// `None` and values shorter than three characters give `default`.
pub fn separator_or_default(stored: Option<&str>, default: char) -> char {
    match stored {
        Some(s) if s.chars().count() > 2 => s.chars().nth(1).unwrap_or(default),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrencyId;

    fn currency() -> Currency {
        Currency::new(CurrencyId::new(1), "EUR", "€")
    }

    #[test]
    fn test_default_pattern() {
        let fmt = create_currency_format(&currency());
        assert_eq!(fmt.format(Money::from_minor(123456789)), "1,234,567.89");
        assert_eq!(fmt.format(Money::from_minor(-50)), "-0.50");
        assert_eq!(fmt.format(Money::zero()), "0.00");
    }

    #[test]
    fn test_stored_separators() {
        let mut c = currency();
        c.decimal_separator = Some("','".into());
        c.group_separator = Some("' '".into());
        let fmt = create_currency_format(&c);
        assert_eq!(fmt.format(Money::from_minor(123456789)), "1 234 567,89");
    }

    #[test]
    fn test_short_separator_falls_back_to_default() {
        assert_eq!(separator_or_default(Some(","), '.'), '.');
        assert_eq!(separator_or_default(Some("''"), ','), ',');
        assert_eq!(separator_or_default(Some(""), ','), ',');
        assert_eq!(separator_or_default(None, '.'), '.');
        assert_eq!(separator_or_default(Some("' '"), ','), ' ');

        let mut c = currency();
        c.decimal_separator = Some(",".into());
        let fmt = create_currency_format(&c);
        assert_eq!(fmt.decimal_separator(), '.');
    }

    #[test]
    fn test_secondary_grouping() {
        let mut c = currency();
        c.number_format = Some("#,##,##0.00".into());
        let fmt = create_currency_format(&c);
        assert_eq!(fmt.format(Money::from_minor(123456700)), "12,34,567.00");
    }

    #[test]
    fn test_symbol_in_pattern() {
        let mut c = currency();
        c.number_format = Some("¤ #,##0.00".into());
        let fmt = create_currency_format(&c);
        assert_eq!(fmt.format(Money::from_minor(150000)), "€ 1,500.00");
        assert_eq!(fmt.format(Money::from_minor(-150000)), "-€ 1,500.00");
        assert_eq!(fmt.format_with_symbol(Money::from_minor(100)), "€ 1.00");
    }

    #[test]
    fn test_format_with_symbol_appends() {
        let fmt = create_currency_format(&currency());
        assert_eq!(fmt.format_with_symbol(Money::from_minor(1999)), "19.99 €");
    }

    #[test]
    fn test_decimals_override_pattern() {
        let mut c = Currency::new(CurrencyId::new(2), "JPY", "¥");
        c.decimals = 0;
        let fmt = create_currency_format(&c);
        assert_eq!(fmt.format(Money::from_minor(1234567)), "1,234,567");

        let mut c = currency();
        c.decimals = 3;
        let fmt = create_currency_format(&c);
        assert_eq!(fmt.format(Money::from_minor(1500)), "1.500");
    }

    #[test]
    fn test_unrepresentable_decimals_render_as_fraction() {
        let mut c = currency();
        c.decimals = 25;
        let fmt = create_currency_format(&c);
        assert_eq!(
            fmt.format(Money::from_minor(-123456)),
            "-0.0000000000000000000123456"
        );
        assert_eq!(fmt.format_value(0.0), "0.0000000000000000000000000");
    }

    #[test]
    fn test_format_value_rounds() {
        let fmt = create_currency_format(&currency());
        assert_eq!(fmt.format_value(1234.567), "1,234.57");
        assert_eq!(fmt.format_value(-0.004), "0.00");
    }

    #[test]
    fn test_pattern_without_grouping() {
        let mut c = currency();
        c.number_format = Some("0.00".into());
        let fmt = create_currency_format(&c);
        assert_eq!(fmt.format(Money::from_minor(123456789)), "1234567.89");
    }
}

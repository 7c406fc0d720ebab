// Number parsing and formatting shared by the engine's CSV loading and its reports.
use crate::models::NumberFormat;

// Groups the integer part of `value` in threes and joins it to the fractional part.
fn format_grouped(value: f64, decimals: usize, thousands_sep: char, decimal_sep: char) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    // "-0.00" is not a useful rendering of a tiny negative amount
    if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(thousands_sep);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push(decimal_sep);
        out.push_str(frac);
    }
    out
}

/// Plain decimal notation: "1234.56" in, "1,234.56" out.
pub mod standard_format {
    use anyhow::{anyhow, Result};
    use std::str::FromStr;

    pub fn parse_decimal(s: &str) -> Result<f64> {
        f64::from_str(s.trim()).map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))
    }

    pub fn parse_integer(s: &str) -> Result<i64> {
        i64::from_str(s.trim()).map_err(|e| anyhow!("Failed to parse integer '{}': {}", s, e))
    }

    pub fn format_decimal(value: f64, decimals: usize) -> String {
        super::format_grouped(value, decimals, ',', '.')
    }

}

/// Brazilian notation: "1.234,56", with '.' as thousands separator.
pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use once_cell::sync::Lazy;
    use regex::Regex;
    use std::str::FromStr;

    // '.' only between full groups of three digits; ungrouped digits are fine too
    static DECIMAL_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^-?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$").expect("valid decimal pattern"));
    static INTEGER_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^-?(\d{1,3}(\.\d{3})+|\d+)$").expect("valid integer pattern"));

    // Parses decimals like "1.234,56" or "123,45" into f64
    pub fn parse_decimal(s: &str) -> Result<f64> {
        let trimmed = s.trim();
        if !DECIMAL_PATTERN.is_match(trimmed) {
            return Err(anyhow!("Failed to parse decimal '{}': not in 1.234,56 notation", s));
        }
        let normalized = trimmed
            .replace('.', "")  // Remove thousand separators
            .replace(',', "."); // Replace decimal separator

        f64::from_str(&normalized)
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))
    }

    // Integers may carry thousand separators, e.g. "24.228"
    pub fn parse_integer(s: &str) -> Result<i64> {
        let trimmed = s.trim();
        if !INTEGER_PATTERN.is_match(trimmed) {
            return Err(anyhow!("Failed to parse integer '{}': not in 1.234 notation", s));
        }
        i64::from_str(&trimmed.replace('.', ""))
            .map_err(|e| anyhow!("Failed to parse integer '{}': {}", s, e))
    }

    pub fn format_decimal(value: f64, decimals: usize) -> String {
        super::format_grouped(value, decimals, '.', ',')
    }

}

/// Formats a money amount as "<symbol> <amount>" with two decimals, e.g. "R$ 1,234.56".
pub fn format_currency(symbol: &str, value: f64, format: NumberFormat) -> String {
    let amount = format.format_decimal(value, 2);
    if symbol.is_empty() {
        amount
    } else {
        format!("{} {}", symbol, amount)
    }
}

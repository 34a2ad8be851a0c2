//! 金额/数量格式化
//!
//! 显示格式使用 `.` 作为千位分隔符、`,` 作为小数点（越南本地习惯）。

use rust_decimal::prelude::*;
use std::str::FromStr;
use thiserror::Error;

const GROUP_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';
const VND_SYMBOL: &str = "₫";

/// 金额解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("not a number: {0}")]
    NotANumber(String),
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

/// 千位分组显示，例如 `1234567.5` -> `1.234.567,5`
pub fn format_grouped(value: &Decimal) -> String {
    let raw = value.to_string();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.as_str()),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if let Some(frac) = frac_part {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(frac);
    }
    out
}

/// 对数字字符串做千位分组；空串或非数字返回空串
pub fn format_grouped_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match Decimal::from_str(trimmed) {
        Ok(value) => format_grouped(&value),
        Err(_) => String::new(),
    }
}

/// 解析分组后的显示字符串，空输入返回 `Ok(None)`
pub fn parse_grouped(input: &str) -> Result<Option<Decimal>, ParseAmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let plain: String = trimmed
        .chars()
        .filter(|c| *c != GROUP_SEPARATOR)
        .map(|c| if c == DECIMAL_SEPARATOR { '.' } else { c })
        .collect();

    if plain.is_empty() || !plain.chars().any(|c| c.is_ascii_digit()) {
        return Err(ParseAmountError::NotANumber(input.to_string()));
    }

    Decimal::from_str(&plain)
        .map(Some)
        .map_err(|_| ParseAmountError::NotANumber(input.to_string()))
}

/// 越南盾货币显示，无小数位；`None` 显示为 `0 ₫`
pub fn format_currency_vnd(value: Option<Decimal>) -> String {
    let amount = value
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let amount = if amount.is_zero() { Decimal::ZERO } else { amount };
    format!("{} {}", format_grouped(&amount), VND_SYMBOL)
}

/// 重量显示，最多两位小数
pub fn format_weight_kg(value: &Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{} kg", format_grouped(&rounded))
}

/// 输入过滤：只保留数字和第一个 `,`，可选保留开头的 `-`
pub fn sanitize_amount_input(raw: &str, allow_negative: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut seen_separator = false;

    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
        } else if ch == DECIMAL_SEPARATOR && !seen_separator {
            seen_separator = true;
            out.push(ch);
        } else if ch == '-' && allow_negative && out.is_empty() {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(&dec("0")), "0");
        assert_eq!(format_grouped(&dec("999")), "999");
        assert_eq!(format_grouped(&dec("1000")), "1.000");
        assert_eq!(format_grouped(&dec("1234567.5")), "1.234.567,5");
        assert_eq!(format_grouped(&dec("-250000")), "-250.000");
        assert_eq!(format_grouped_str(""), "");
        assert_eq!(format_grouped_str("  "), "");
        assert_eq!(format_grouped_str("abc"), "");
        assert_eq!(format_grouped_str("2500050.00"), "2.500.050,00");
    }

    #[test]
    fn test_parse_grouped() {
        assert_eq!(parse_grouped(""), Ok(None));
        assert_eq!(parse_grouped("1.234.567,5"), Ok(Some(dec("1234567.5"))));
        assert_eq!(parse_grouped("-250.000"), Ok(Some(dec("-250000"))));
        assert!(parse_grouped("12a").is_err());
        assert!(parse_grouped("1,2,3").is_err());
        assert!(parse_grouped(".").is_err());
    }

    #[test]
    fn test_round_trip_two_decimal_places() {
        for raw in ["0", "1", "12.5", "999.99", "1000", "1234567.89", "100000000.01"] {
            let value = dec(raw);
            let formatted = format_grouped(&value);
            assert_eq!(parse_grouped(&formatted), Ok(Some(value)), "{}", raw);
        }
    }

    #[test]
    fn test_format_currency_vnd() {
        assert_eq!(format_currency_vnd(None), "0 ₫");
        assert_eq!(format_currency_vnd(Some(dec("1234567"))), "1.234.567 ₫");
        assert_eq!(format_currency_vnd(Some(dec("1234.5"))), "1.235 ₫");
        assert_eq!(format_currency_vnd(Some(dec("-50000"))), "-50.000 ₫");
        assert_eq!(format_currency_vnd(Some(dec("-0.4"))), "0 ₫");
    }

    #[test]
    fn test_sanitize_amount_input() {
        assert_eq!(sanitize_amount_input("1.234,5,6", false), "1234,56");
        assert_eq!(sanitize_amount_input("-12a3", false), "123");
        assert_eq!(sanitize_amount_input("-12a3", true), "-123");
        assert_eq!(sanitize_amount_input("1-2", true), "12");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight_kg(&dec("12.50")), "12,5 kg");
        assert_eq!(format_weight_kg(&dec("1500")), "1.500 kg");
    }
}

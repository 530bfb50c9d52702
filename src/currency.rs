//! Parsing and display helpers for rupee amounts.
//!
//! Amounts are grouped the Indian way (last three digits, then pairs:
//! `12,34,567`) and spelled out on the lakh/crore scale. None of these
//! functions fail: bad input degrades to zero or an empty string.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::types::{round_unit, Money};

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u128 = 10_000_000;
const LAKH: u128 = 100_000;
const THOUSAND: u128 = 1_000;

const CURRENCY_SYMBOL: char = '₹';

/// Parses a user-entered amount such as `"12,34,567.50"`.
///
/// Grouping commas are stripped and the longest leading numeric prefix is
/// read, so `"1500 rupees"` parses as `1500`. Empty or non-numeric input
/// yields zero.
pub fn parse_amount(text: &str) -> Money {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    leading_number(cleaned.trim_start()).unwrap_or(Decimal::ZERO)
}

fn leading_number(text: &str) -> Option<Decimal> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let integer = &text[int_start..pos];

    let mut fraction = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        fraction = &text[frac_start..end];
        pos = end;
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut mantissa = String::with_capacity(integer.len() + fraction.len() + 2);
    if negative {
        mantissa.push('-');
    }
    mantissa.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        mantissa.push('.');
        mantissa.push_str(fraction);
    }

    match exponent_suffix(&text[pos..]) {
        Some(exponent) => Decimal::from_scientific(&format!("{mantissa}e{exponent}")).ok(),
        None => Decimal::from_str(&mantissa).ok(),
    }
}

/// Reads an `e`/`E` exponent at the start of `rest`, if a complete one is there.
fn exponent_suffix(rest: &str) -> Option<&str> {
    let bytes = rest.as_bytes();
    if !matches!(bytes.first(), Some(b'e' | b'E')) {
        return None;
    }
    let mut end = 1;
    if matches!(bytes.get(1), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    (end > digits_start).then(|| &rest[1..end])
}

/// Re-renders raw input with Indian digit grouping, e.g. `"1234567"` -> `"12,34,567"`.
///
/// Everything except digits and the decimal point is dropped. Only the
/// integer part is grouped; at most two decimal digits are kept.
pub fn format_grouped_input(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = cleaned.split('.');
    let whole = parts.next().unwrap_or_default();
    let decimals = parts.next().unwrap_or_default();

    let grouped = group_indian(whole);
    if decimals.is_empty() {
        grouped
    } else {
        format!("{grouped}.{}", &decimals[..decimals.len().min(2)])
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(last_three);
    out
}

/// Formats an amount as Indian rupees with exactly two decimals, e.g. `"₹12,34,567.00"`.
///
/// Half paisa round away from zero. Negative amounts carry a leading minus
/// sign before the symbol.
pub fn format_currency_display(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = rounded.abs();
    let whole = magnitude.trunc();
    let paisa = ((magnitude - whole) * dec!(100)).to_u32().unwrap_or(0);

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let grouped = group_indian(&whole.normalize().to_string());
    format!("{sign}{CURRENCY_SYMBOL}{grouped}.{paisa:02}")
}

/// Spells a whole number on the Indian scale, e.g. `1_500_000` -> `"Fifteen Lakh"`.
///
/// Counts of a hundred crore or more are themselves spelled on the same
/// scale (`"One Thousand Crore"`).
pub fn number_to_words(number: u128) -> String {
    if number == 0 {
        return "Zero".to_string();
    }

    let crore = number / CRORE;
    let lakh = (number % CRORE) / LAKH;
    let thousand = (number % LAKH) / THOUSAND;
    let rest = number % THOUSAND;

    let mut segments = Vec::with_capacity(4);
    if crore > 0 {
        segments.push(format!("{} Crore", number_to_words(crore)));
    }
    if lakh > 0 {
        segments.push(format!("{} Lakh", below_thousand(lakh)));
    }
    if thousand > 0 {
        segments.push(format!("{} Thousand", below_thousand(thousand)));
    }
    if rest > 0 {
        segments.push(below_thousand(rest));
    }
    segments.join(" ")
}

/// Words for `1..=999`.
fn below_thousand(n: u128) -> String {
    let n = n as usize;
    if n < 20 {
        return ONES[n].to_string();
    }
    if n < 100 {
        return match n % 10 {
            0 => TENS[n / 10].to_string(),
            unit => format!("{} {}", TENS[n / 10], ONES[unit]),
        };
    }
    match n % 100 {
        0 => format!("{} Hundred", ONES[n / 100]),
        rest => format!("{} Hundred {}", ONES[n / 100], below_thousand(rest as u128)),
    }
}

/// Describes an amount in words, e.g. `500000.50` -> `"Rupees Five Lakh and Fifty Paisa"`.
///
/// The rupee part is the floor of the amount and the paisa part its
/// fraction rounded to two digits; a fraction that rounds up to a full
/// rupee carries over. Zero is `"Zero Rupees"`.
pub fn amount_in_words(amount: Money) -> String {
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let magnitude = amount.abs();

    let mut rupees = magnitude.floor();
    let mut paisa = round_unit((magnitude - rupees) * dec!(100));
    if paisa >= dec!(100) {
        rupees += Decimal::ONE;
        paisa = Decimal::ZERO;
    }
    let rupees = rupees.to_u128().unwrap_or(0);
    let paisa = paisa.to_u128().unwrap_or(0);

    let mut words = String::new();
    if rupees > 0 {
        words.push_str("Rupees ");
        words.push_str(&number_to_words(rupees));
    }
    if paisa > 0 {
        if rupees > 0 {
            words.push_str(" and ");
        }
        words.push_str(&number_to_words(paisa));
        words.push_str(" Paisa");
    }

    if words.is_empty() {
        "Zero Rupees".to_string()
    } else if negative {
        format!("Minus {words}")
    } else {
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12,34,567", dec!(1234567))]
    #[case("1234567.89", dec!(1234567.89))]
    #[case("  42", dec!(42))]
    #[case("1500 rupees", dec!(1500))]
    #[case(".5", dec!(0.5))]
    #[case("-3,000", dec!(-3000))]
    #[case("1.5e3", dec!(1500))]
    #[case("7e", dec!(7))]
    #[case("", dec!(0))]
    #[case("abc", dec!(0))]
    #[case(".", dec!(0))]
    fn test_parse_amount(#[case] input: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(input), expected);
    }

    #[test]
    fn test_parse_amount_overflow_degrades_to_zero() {
        assert_eq!(parse_amount(&"9".repeat(40)), Decimal::ZERO);
    }

    #[rstest]
    #[case("1234567", "12,34,567")]
    #[case("12345", "12,345")]
    #[case("123456", "1,23,456")]
    #[case("123", "123")]
    #[case("5000000", "50,00,000")]
    #[case("12,34,567", "12,34,567")]
    #[case("1234.5678", "1,234.56")]
    #[case("₹ 10000", "10,000")]
    #[case("1.2.3", "1.2")]
    #[case("", "")]
    fn test_format_grouped_input(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_grouped_input(input), expected);
    }

    #[rstest]
    #[case(dec!(1234567), "₹12,34,567.00")]
    #[case(dec!(16801), "₹16,801.00")]
    #[case(dec!(999.995), "₹1,000.00")]
    #[case(dec!(0.5), "₹0.50")]
    #[case(dec!(0), "₹0.00")]
    #[case(dec!(-1234.5), "-₹1,234.50")]
    fn test_format_currency_display(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_currency_display(amount), expected);
    }

    #[rstest]
    #[case(0, "Zero")]
    #[case(7, "Seven")]
    #[case(19, "Nineteen")]
    #[case(40, "Forty")]
    #[case(99, "Ninety Nine")]
    #[case(100, "One Hundred")]
    #[case(215, "Two Hundred Fifteen")]
    #[case(16801, "Sixteen Thousand Eight Hundred One")]
    #[case(1_008_060, "Ten Lakh Eight Thousand Sixty")]
    #[case(520_001_000, "Fifty Two Crore One Thousand")]
    #[case(1000 * 10_000_000, "One Thousand Crore")]
    fn test_number_to_words(#[case] number: u128, #[case] expected: &str) {
        assert_eq!(number_to_words(number), expected);
    }

    #[test]
    fn test_amount_in_words_lakh() {
        assert!(amount_in_words(dec!(500000)).starts_with("Rupees Five Lakh"));
        assert_eq!(amount_in_words(dec!(500000)), "Rupees Five Lakh");
    }

    #[test]
    fn test_amount_in_words_zero() {
        assert_eq!(amount_in_words(dec!(0)), "Zero Rupees");
        assert_eq!(amount_in_words(dec!(0.001)), "Zero Rupees");
    }

    #[test]
    fn test_amount_in_words_with_paisa() {
        assert_eq!(
            amount_in_words(dec!(1250.75)),
            "Rupees One Thousand Two Hundred Fifty and Seventy Five Paisa"
        );
        assert_eq!(amount_in_words(dec!(0.5)), "Fifty Paisa");
    }

    #[test]
    fn test_amount_in_words_carries_rounded_paisa() {
        assert_eq!(amount_in_words(dec!(9.999)), "Rupees Ten");
    }

    #[test]
    fn test_amount_in_words_negative() {
        assert_eq!(amount_in_words(dec!(-25)), "Minus Rupees Twenty Five");
    }
}

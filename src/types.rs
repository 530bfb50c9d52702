use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::CalcError;
use crate::CalcResult;

/// All monetary values, in rupees.
pub type Money = Decimal;

/// Rates as entered on the calculators: annual percentages (9.5 = 9.5%).
pub type Rate = Decimal;

/// Terms in years. May be fractional (2.5 = 30 months).
pub type Years = Decimal;

/// Rounds half up to a whole rupee, i.e. `floor(x + 0.5)`.
///
/// Halves on the negative side round towards positive infinity
/// (`-2.5 -> -2`), matching the figures the calculators display.
pub fn round_unit(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        value.round_dp_with_strategy(0, RoundingStrategy::MidpointTowardZero)
    } else {
        value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Converts an annual percentage rate to the monthly decimal rate `r = rate / 1200`.
pub fn monthly_rate(annual_rate_percent: Rate) -> Rate {
    annual_rate_percent / dec!(1200)
}

/// Number of months in a term, `n = years * 12`. Fractional terms keep their fraction.
pub fn term_months(term_years: Years) -> CalcResult<Decimal> {
    term_years
        .checked_mul(dec!(12))
        .ok_or_else(|| CalcError::overflow("term months"))
}

/// Number of months the simulators step through: the whole part of `n`.
pub(crate) fn simulated_months(months: Decimal) -> CalcResult<u32> {
    months
        .floor()
        .to_u32()
        .ok_or_else(|| CalcError::overflow("simulated month count"))
}

/// Compound factor `(1 + r)^n`.
///
/// Whole month counts use integer exponentiation; fractional ones fall back
/// to `powd`.
pub(crate) fn compound_factor(rate: Rate, months: Decimal) -> CalcResult<Decimal> {
    let base = Decimal::ONE + rate;
    let factor = if months.fract().is_zero() {
        let exponent = months
            .to_u64()
            .ok_or_else(|| CalcError::overflow("compound factor exponent"))?;
        base.checked_powu(exponent)
    } else {
        base.checked_powd(months)
    };
    factor.ok_or_else(|| CalcError::overflow("compound factor (1 + r)^n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(dec!(16801.489), dec!(16801))]
    #[case(dec!(2.5), dec!(3))]
    #[case(dec!(2.4999), dec!(2))]
    #[case(dec!(-2.5), dec!(-2))]
    #[case(dec!(-2.51), dec!(-3))]
    #[case(dec!(0), dec!(0))]
    fn test_round_unit_is_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_unit(input), expected);
    }

    #[test]
    fn test_monthly_rate_divides_by_twelve_hundred() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
    }

    #[test]
    fn test_term_months_keeps_fraction() {
        assert_eq!(term_months(dec!(5)).unwrap(), dec!(60));
        assert_eq!(term_months(dec!(1.25)).unwrap(), dec!(15));
        assert_eq!(simulated_months(dec!(15.6)).unwrap(), 15);
    }

    #[test]
    fn test_compound_factor_whole_months() {
        let factor = compound_factor(dec!(0.01), dec!(12)).unwrap();
        assert_eq!(factor.round_dp(6), dec!(1.126825));
    }

    #[test]
    fn test_compound_factor_overflow_is_an_error() {
        let result = compound_factor(dec!(1), dec!(1000));
        assert!(matches!(result, Err(CalcError::Overflow { .. })));
    }
}

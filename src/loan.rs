//! Loan math primitives: EMI, total payment and total interest.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::types::{compound_factor, monthly_rate, round_unit, term_months, Money, Rate, Years};
use crate::CalcResult;

/// Input parameters for a loan calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// The amount borrowed.
    pub principal: Money,
    /// The annual interest rate as a percentage (e.g., 9.5 for 9.5%).
    pub annual_rate_percent: Rate,
    /// The loan term in years.
    pub term_years: Years,
}

impl LoanParameters {
    /// Builds a validated set of loan parameters.
    ///
    /// # Errors
    ///
    /// Returns `CalcError::InvalidInput` if any value is not strictly positive
    /// or the term is shorter than one month.
    pub fn new(principal: Money, annual_rate_percent: Rate, term_years: Years) -> CalcResult<Self> {
        let params = Self {
            principal,
            annual_rate_percent,
            term_years,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the invariants `principal > 0`, `rate > 0` and `term >= 1 month`.
    pub fn validate(&self) -> CalcResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(CalcError::invalid("principal", "must be greater than zero"));
        }
        if self.annual_rate_percent <= Decimal::ZERO {
            return Err(CalcError::invalid(
                "annual_rate_percent",
                "must be greater than zero",
            ));
        }
        if term_months(self.term_years)? < Decimal::ONE {
            return Err(CalcError::invalid("term_years", "must cover at least one month"));
        }
        Ok(())
    }

    /// Monthly decimal rate, `annual_rate_percent / 1200`.
    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate_percent)
    }

    /// The EMI rounded to a whole rupee, as shown on the calculators and
    /// paid in every scheduled month.
    pub fn rounded_emi(&self) -> CalcResult<Money> {
        compute_emi(self.principal, self.annual_rate_percent, self.term_years).map(round_unit)
    }
}

/// Headline figures for a loan, derived from the nominal (no prepayment) term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    /// Rounded monthly instalment.
    pub emi: Money,
    /// `emi * months`, rounded.
    pub total_payment: Money,
    /// The amount borrowed.
    pub total_principal: Money,
    /// `total_payment - principal`, rounded.
    pub total_interest: Money,
}

impl LoanSummary {
    /// Computes the headline EMI, total payment and total interest for a loan.
    ///
    /// # Errors
    ///
    /// Propagates validation and arithmetic errors from the parameters and
    /// the EMI formula.
    pub fn compute(params: &LoanParameters) -> CalcResult<Self> {
        params.validate()?;
        let emi = params.rounded_emi()?;
        let total_payment = compute_total_payment(emi, params.term_years);
        let total_interest = compute_total_interest(total_payment, params.principal);

        Ok(Self {
            emi,
            total_payment,
            total_principal: params.principal,
            total_interest,
        })
    }
}

/// Calculates the Equated Monthly Instalment.
///
/// The formula is: EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), with
/// `r = rate / 1200` and `n = years * 12`. The result is not rounded.
///
/// A rate of exactly zero has no defined annuity factor; the straight-line
/// instalment `P / n` is returned instead.
///
/// # Arguments
///
/// * `principal` - The amount borrowed.
/// * `annual_rate_percent` - The annual interest rate as a percentage.
/// * `term_years` - The loan term in years.
///
/// # Errors
///
/// Returns `CalcError::InvalidInput` for a negative principal or rate, or a
/// term shorter than one month, and `CalcError::Overflow` when `(1 + r)^n`
/// does not fit a `Decimal`.
pub fn compute_emi(
    principal: Money,
    annual_rate_percent: Rate,
    term_years: Years,
) -> CalcResult<Money> {
    if principal < Decimal::ZERO {
        return Err(CalcError::invalid("principal", "cannot be negative"));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(CalcError::invalid("annual_rate_percent", "cannot be negative"));
    }
    let months = term_months(term_years)?;
    if months < Decimal::ONE {
        return Err(CalcError::invalid("term_years", "must cover at least one month"));
    }

    if annual_rate_percent.is_zero() {
        return Ok(principal / months);
    }

    let rate = monthly_rate(annual_rate_percent);
    let factor = compound_factor(rate, months)?;
    let denominator = factor - dec!(1);
    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "EMI annuity factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| CalcError::overflow("EMI"))
}

/// Total paid over the nominal term: `round(emi * years * 12)`.
pub fn compute_total_payment(emi: Money, term_years: Years) -> Money {
    round_unit(emi * term_years * dec!(12))
}

/// Total interest over the nominal term: `round(total_payment - principal)`.
pub fn compute_total_interest(total_payment: Money, principal: Money) -> Money {
    round_unit(total_payment - principal)
}

//! Growth of a systematic investment plan (SIP) with optional one-off withdrawals.
//!
//! Mirrors [`crate::amortization`]: a monthly ledger built with whole-rupee
//! interest, folded into yearly rows, next to headline figures taken from the
//! closed-form future value over the nominal term.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::CalcError;
use crate::period::{group_by_year, AdjustmentMap, PeriodKey, PeriodRow};
use crate::types::{
    compound_factor, monthly_rate, round_unit, simulated_months, term_months, Money, Rate, Years,
};
use crate::CalcResult;

/// Input parameters for an investment plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParameters {
    /// Amount invested every month.
    pub periodic_contribution: Money,
    /// The expected annual return as a percentage (e.g., 12 for 12%).
    pub annual_rate_percent: Rate,
    /// The plan duration in years.
    pub term_years: Years,
}

impl GrowthParameters {
    /// Builds a validated set of plan parameters.
    ///
    /// # Errors
    ///
    /// Returns `CalcError::InvalidInput` if any value is not strictly positive
    /// or the term is shorter than one month.
    pub fn new(
        periodic_contribution: Money,
        annual_rate_percent: Rate,
        term_years: Years,
    ) -> CalcResult<Self> {
        let params = Self {
            periodic_contribution,
            annual_rate_percent,
            term_years,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.periodic_contribution <= Decimal::ZERO {
            return Err(CalcError::invalid(
                "periodic_contribution",
                "must be greater than zero",
            ));
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

    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate_percent)
    }
}

/// Headline figures for a plan over its nominal term, ignoring withdrawals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    /// Amount invested every month.
    pub periodic_contribution: Money,
    /// `contribution * months`, rounded.
    pub total_contribution: Money,
    /// `future_value - total_contribution`, rounded.
    pub total_returns: Money,
    /// Closed-form future value, rounded.
    pub total_future_value: Money,
}

impl GrowthSummary {
    pub fn compute(params: &GrowthParameters) -> CalcResult<Self> {
        params.validate()?;
        let months = term_months(params.term_years)?;
        let future_value = compute_future_value(
            params.periodic_contribution,
            params.annual_rate_percent,
            params.term_years,
        )?;
        let invested = params
            .periodic_contribution
            .checked_mul(months)
            .ok_or_else(|| CalcError::overflow("total contribution"))?;

        Ok(Self {
            periodic_contribution: params.periodic_contribution,
            total_contribution: round_unit(invested),
            total_returns: round_unit(future_value - invested),
            total_future_value: round_unit(future_value),
        })
    }
}

/// Future value of a monthly contribution paid at the start of each month.
///
/// The formula is: FV = P * ((1 + r)^n - 1) / r * (1 + r), with
/// `r = rate / 1200` and `n = years * 12`. A zero rate returns `P * n`.
///
/// # Errors
///
/// Returns `CalcError::InvalidInput` for a negative rate and
/// `CalcError::Overflow` when the compound factor does not fit a `Decimal`.
pub fn compute_future_value(
    contribution: Money,
    annual_rate_percent: Rate,
    term_years: Years,
) -> CalcResult<Money> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(CalcError::invalid("annual_rate_percent", "cannot be negative"));
    }
    let months = term_months(term_years)?;
    if annual_rate_percent.is_zero() {
        return contribution
            .checked_mul(months)
            .ok_or_else(|| CalcError::overflow("future value"));
    }

    let rate = monthly_rate(annual_rate_percent);
    let factor = compound_factor(rate, months)?;
    contribution
        .checked_mul((factor - Decimal::ONE) / rate)
        .and_then(|v| v.checked_mul(Decimal::ONE + rate))
        .ok_or_else(|| CalcError::overflow("future value"))
}

/// One month of a plan ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    /// Sequential month of the term, starting at 1.
    pub month: u32,
    /// Year of the term, starting at 1.
    pub year: u32,
    /// Month within the year, `1..=12`.
    pub month_in_year: u32,
    /// Value before this month's contribution, interest and withdrawal.
    pub starting_value: Money,
    /// Amount invested this month.
    pub contribution: Money,
    /// Interest on the starting value, rounded to a whole rupee.
    pub interest_earned: Money,
    /// Amount actually withdrawn; capped at what the plan held.
    pub withdrawal: Money,
    /// `starting_value + interest_earned + contribution - withdrawal`.
    pub ending_value: Money,
}

impl PeriodRow for GrowthRow {
    fn year(&self) -> u32 {
        self.year
    }
}

/// A year of a plan ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthYear {
    /// Year of the term, starting at 1.
    pub year: u32,
    /// Starting value of the first month of the year.
    pub starting_value: Money,
    /// Contributions made in the year.
    pub yearly_contribution: Money,
    /// Interest earned in the year.
    pub yearly_interest: Money,
    /// Withdrawals paid out in the year.
    pub yearly_withdrawal: Money,
    /// Ending value of the last month of the year.
    pub ending_value: Money,
    /// Months simulated in the year; fewer than 12 only for a final partial year.
    pub months: u32,
}

impl GrowthYear {
    fn from_months(rows: &[GrowthRow]) -> Option<Self> {
        let first = rows.first()?;
        let last = rows.last()?;
        let seed = Self {
            year: first.year,
            starting_value: first.starting_value,
            yearly_contribution: Decimal::ZERO,
            yearly_interest: Decimal::ZERO,
            yearly_withdrawal: Decimal::ZERO,
            ending_value: last.ending_value,
            months: 0,
        };

        Some(rows.iter().fold(seed, |acc, row| Self {
            yearly_contribution: acc.yearly_contribution + row.contribution,
            yearly_interest: acc.yearly_interest + row.interest_earned,
            yearly_withdrawal: acc.yearly_withdrawal + row.withdrawal,
            months: acc.months + 1,
            ..acc
        }))
    }
}

/// How withdrawals changed a plan against its headline future value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalImpact {
    /// Headline future value over the nominal term.
    pub nominal_future_value: Money,
    /// Value left at the end of the adjusted ledger.
    pub final_value: Money,
    /// Sum of the withdrawals actually paid out.
    pub total_withdrawn: Money,
    /// `nominal_future_value - final_value`.
    pub shortfall: Money,
}

/// The full ledger of a plan, monthly and aggregated by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSchedule {
    /// Number of months in the nominal term.
    pub nominal_months: u32,
    /// One row per simulated month.
    pub monthly: Vec<GrowthRow>,
    /// The monthly rows summed per year.
    pub yearly: Vec<GrowthYear>,
}

impl GrowthSchedule {
    /// The ledger with no withdrawals.
    pub fn nominal(params: &GrowthParameters) -> CalcResult<Self> {
        build_growth_schedule(params, &AdjustmentMap::new())
    }

    pub fn total_contribution(&self) -> Money {
        self.monthly.iter().map(|row| row.contribution).sum()
    }

    pub fn total_interest(&self) -> Money {
        self.monthly.iter().map(|row| row.interest_earned).sum()
    }

    pub fn total_withdrawn(&self) -> Money {
        self.monthly.iter().map(|row| row.withdrawal).sum()
    }

    pub fn final_value(&self) -> Money {
        self.monthly.last().map_or(Decimal::ZERO, |row| row.ending_value)
    }

    /// True when withdrawals emptied the plan.
    pub fn fully_withdrawn(&self) -> bool {
        self.final_value().is_zero() && !self.monthly.is_empty()
    }

    pub fn withdrawal_impact(&self, nominal: &GrowthSummary) -> WithdrawalImpact {
        let final_value = self.final_value();
        WithdrawalImpact {
            nominal_future_value: nominal.total_future_value,
            final_value,
            total_withdrawn: self.total_withdrawn(),
            shortfall: nominal.total_future_value - final_value,
        }
    }
}

/// Builds the month-by-month ledger of a plan and its yearly aggregation.
///
/// Each month earns whole-rupee interest on the value carried in from the
/// previous month, then receives the contribution, then pays out the
/// withdrawal for that month. A withdrawal larger than the plan empties it
/// and ends the ledger.
///
/// # Arguments
///
/// * `params` - Validated plan parameters.
/// * `withdrawals` - One-off withdrawals keyed by period; may be empty.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, or `CalcError::Overflow`
/// when the plan value no longer fits a `Decimal`.
#[instrument(skip(withdrawals), fields(adjustments = withdrawals.len()))]
pub fn build_growth_schedule(
    params: &GrowthParameters,
    withdrawals: &AdjustmentMap,
) -> CalcResult<GrowthSchedule> {
    params.validate()?;

    let rate = params.monthly_rate();
    let contribution = params.periodic_contribution;
    let nominal_months = simulated_months(term_months(params.term_years)?)?;

    let mut value = Decimal::ZERO;
    let mut monthly = Vec::with_capacity(nominal_months as usize);

    for month in 1..=nominal_months {
        let period = PeriodKey::from_month_index(month)?;
        let starting_value = value;
        let interest = value
            .checked_mul(rate)
            .map(round_unit)
            .ok_or_else(|| CalcError::overflow("growth ledger"))?;
        value = value
            .checked_add(contribution)
            .and_then(|v| v.checked_add(interest))
            .ok_or_else(|| CalcError::overflow("growth ledger"))?;

        let withdrawal = withdrawals.get(&period).min(value);
        value -= withdrawal;

        trace!(month, %interest, %withdrawal, %value, "grew month");

        monthly.push(GrowthRow {
            month,
            year: period.year(),
            month_in_year: period.month(),
            starting_value,
            contribution,
            interest_earned: interest,
            withdrawal,
            ending_value: value,
        });

        if value.is_zero() {
            debug!(month, nominal_months, "plan fully withdrawn");
            break;
        }
    }

    let yearly = group_by_year(&monthly)
        .filter_map(GrowthYear::from_months)
        .collect();

    Ok(GrowthSchedule {
        nominal_months,
        monthly,
        yearly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn small_plan(years: Decimal) -> GrowthParameters {
        GrowthParameters::new(dec!(1000), dec!(12), years).unwrap()
    }

    #[test]
    fn test_summary_happy_path() {
        let summary = GrowthSummary::compute(&small_plan(dec!(1))).unwrap();
        assert_eq!(
            summary,
            GrowthSummary {
                periodic_contribution: dec!(1000),
                total_contribution: dec!(12000),
                total_returns: dec!(809),
                total_future_value: dec!(12809),
            }
        );
    }

    #[test]
    fn test_sip_preset_summary() {
        let params = GrowthParameters::new(dec!(10000), dec!(9), dec!(20)).unwrap();
        let summary = GrowthSummary::compute(&params).unwrap();
        assert_eq!(summary.total_contribution, dec!(2400000));
        assert_eq!(summary.total_future_value, dec!(6728960));
        assert_eq!(summary.total_returns, dec!(4328960));
    }

    #[test]
    fn test_first_months_of_ledger() {
        let schedule = GrowthSchedule::nominal(&small_plan(dec!(1))).unwrap();

        assert_eq!(
            schedule.monthly[0],
            GrowthRow {
                month: 1,
                year: 1,
                month_in_year: 1,
                starting_value: dec!(0),
                contribution: dec!(1000),
                interest_earned: dec!(0),
                withdrawal: dec!(0),
                ending_value: dec!(1000),
            }
        );
        assert_eq!(schedule.monthly[4].interest_earned, dec!(41));
        assert_eq!(schedule.monthly[4].ending_value, dec!(5101));
    }

    #[test]
    fn test_yearly_row() {
        let schedule = GrowthSchedule::nominal(&small_plan(dec!(1))).unwrap();
        assert_eq!(
            schedule.yearly,
            vec![GrowthYear {
                year: 1,
                starting_value: dec!(0),
                yearly_contribution: dec!(12000),
                yearly_interest: dec!(684),
                yearly_withdrawal: dec!(0),
                ending_value: dec!(12684),
                months: 12,
            }]
        );
    }

    #[test]
    fn test_oversized_withdrawal_empties_plan() {
        let withdrawals = AdjustmentMap::new()
            .with(PeriodKey::new(1, 6).unwrap(), dec!(100000))
            .unwrap();
        let schedule = build_growth_schedule(&small_plan(dec!(2)), &withdrawals).unwrap();

        assert_eq!(schedule.monthly.len(), 6);
        let last = schedule.monthly.last().unwrap();
        assert_eq!(last.starting_value, dec!(5101));
        assert_eq!(last.withdrawal, dec!(6152));
        assert_eq!(last.ending_value, dec!(0));
        assert!(schedule.fully_withdrawn());
        assert_eq!(schedule.yearly.len(), 1);
        assert_eq!(schedule.yearly[0].months, 6);
    }

    #[test]
    fn test_withdrawal_reduces_later_interest() {
        let params = small_plan(dec!(2));
        let nominal = GrowthSchedule::nominal(&params).unwrap();
        let mut withdrawals = AdjustmentMap::new();
        withdrawals.insert_yearly(1, dec!(5000)).unwrap();
        let adjusted = build_growth_schedule(&params, &withdrawals).unwrap();

        assert_eq!(adjusted.monthly.len(), 24);
        assert_eq!(adjusted.yearly[0].yearly_withdrawal, dec!(5000));
        assert_eq!(adjusted.yearly[0].ending_value, dec!(7684));
        assert!(adjusted.total_interest() < nominal.total_interest());
        assert_eq!(adjusted.yearly[1].starting_value, adjusted.yearly[0].ending_value);

        let summary = GrowthSummary::compute(&params).unwrap();
        let impact = adjusted.withdrawal_impact(&summary);
        assert_eq!(impact.total_withdrawn, dec!(5000));
        assert_eq!(impact.shortfall, summary.total_future_value - adjusted.final_value());
    }

    #[test]
    fn test_zero_rate_future_value() {
        assert_eq!(compute_future_value(dec!(500), dec!(0), dec!(2)).unwrap(), dec!(12000));
    }

    #[test]
    fn test_growth_ledger_overflow_is_an_error() {
        let params = GrowthParameters::new(dec!(1e27), dec!(30), dec!(50)).unwrap();

        let summary = GrowthSummary::compute(&params);
        assert!(matches!(summary, Err(CalcError::Overflow { .. })));

        let schedule = GrowthSchedule::nominal(&params);
        assert_eq!(
            schedule,
            Err(CalcError::Overflow {
                context: "growth ledger".into()
            })
        );
    }

    #[test]
    fn test_parameters_reject_non_positive_values() {
        assert!(GrowthParameters::new(dec!(0), dec!(12), dec!(1)).is_err());
        assert!(GrowthParameters::new(dec!(1000), dec!(-1), dec!(1)).is_err());
        assert!(GrowthParameters::new(dec!(1000), dec!(12), dec!(0)).is_err());
    }
}

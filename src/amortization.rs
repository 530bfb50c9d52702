//! Month-by-month loan amortization with optional one-off prepayments.
//!
//! Every figure is rounded to a whole rupee in the month it is computed, so
//! each row adds up exactly. The cost is a small drift: a loan run for its
//! full term can end with a few rupees outstanding, reported through
//! [`AmortizationSchedule::rounding_residual`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::currency::format_currency_display;
use crate::error::CalcError;
use crate::loan::{LoanParameters, LoanSummary};
use crate::period::{group_by_year, AdjustmentMap, PeriodKey, PeriodRow};
use crate::types::{round_unit, simulated_months, term_months, Money};
use crate::CalcResult;

/// One month of a loan ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Sequential month of the term, starting at 1.
    pub month: u32,
    /// Year of the term, starting at 1.
    pub year: u32,
    /// Month within the year, `1..=12`.
    pub month_in_year: u32,
    /// Balance before this month's payment; equals the previous closing balance.
    pub opening_balance: Money,
    /// Interest plus principal paid through the EMI this month.
    pub period_payment: Money,
    /// Interest on the opening balance, rounded to a whole rupee.
    pub interest_component: Money,
    /// EMI less interest, rounded; capped at what is left to repay.
    pub principal_component: Money,
    /// Prepayment applied on top of the EMI.
    pub adjustment: Money,
    /// `opening_balance - principal_component - adjustment`, never negative.
    pub closing_balance: Money,
}

impl PeriodRow for AmortizationRow {
    fn year(&self) -> u32 {
        self.year
    }
}

/// A year of a loan ledger: the sums of its monthly rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    /// Year of the term, starting at 1.
    pub year: u32,
    /// Opening balance of the first month of the year.
    pub opening_balance: Money,
    /// EMI payments made in the year.
    pub yearly_payment: Money,
    /// Interest paid in the year.
    pub yearly_interest: Money,
    /// Principal repaid through the EMI in the year.
    pub yearly_principal: Money,
    /// Prepayments applied in the year.
    pub yearly_adjustment: Money,
    /// Closing balance of the last month of the year.
    pub closing_balance: Money,
    /// Months simulated in the year; fewer than 12 only for a final partial year.
    pub months: u32,
}

impl AmortizationYear {
    fn from_months(rows: &[AmortizationRow]) -> Option<Self> {
        let first = rows.first()?;
        let last = rows.last()?;
        let seed = Self {
            year: first.year,
            opening_balance: first.opening_balance,
            yearly_payment: Decimal::ZERO,
            yearly_interest: Decimal::ZERO,
            yearly_principal: Decimal::ZERO,
            yearly_adjustment: Decimal::ZERO,
            closing_balance: last.closing_balance,
            months: 0,
        };

        Some(rows.iter().fold(seed, |acc, row| Self {
            yearly_payment: acc.yearly_payment + row.period_payment,
            yearly_interest: acc.yearly_interest + row.interest_component,
            yearly_principal: acc.yearly_principal + row.principal_component,
            yearly_adjustment: acc.yearly_adjustment + row.adjustment,
            months: acc.months + 1,
            ..acc
        }))
    }
}

/// What a set of prepayments saves against the nominal loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentSavings {
    /// Total payable over the nominal term, from the headline summary.
    pub nominal_total: Money,
    /// Sum of every EMI paid plus every prepayment in the adjusted ledger.
    pub adjusted_total: Money,
    /// `nominal_total - adjusted_total`.
    pub amount_saved: Money,
    /// Headline total interest minus the interest actually paid in the ledger.
    pub interest_saved: Money,
    /// Months cut from the nominal term.
    pub months_saved: u32,
}

/// The full ledger of a loan, monthly and aggregated by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// The rounded EMI paid every month.
    pub emi: Money,
    /// Number of months in the nominal term.
    pub nominal_months: u32,
    /// One row per simulated month.
    pub monthly: Vec<AmortizationRow>,
    /// The monthly rows summed per year.
    pub yearly: Vec<AmortizationYear>,
}

impl AmortizationSchedule {
    /// The ledger with no prepayments.
    pub fn nominal(params: &LoanParameters) -> CalcResult<Self> {
        build_amortization_schedule(params, &AdjustmentMap::new())
    }

    pub fn total_interest(&self) -> Money {
        self.monthly.iter().map(|row| row.interest_component).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.monthly.iter().map(|row| row.principal_component).sum()
    }

    pub fn total_adjustments(&self) -> Money {
        self.monthly.iter().map(|row| row.adjustment).sum()
    }

    /// Sum of the EMI payments actually made, excluding prepayments.
    pub fn total_payments(&self) -> Money {
        self.monthly.iter().map(|row| row.period_payment).sum()
    }

    /// Number of months until the balance reached zero, or the full term.
    pub fn months_to_close(&self) -> u32 {
        self.monthly.len() as u32
    }

    /// Balance left after the last simulated month.
    pub fn closing_balance(&self) -> Money {
        self.monthly
            .last()
            .map_or(Decimal::ZERO, |row| row.closing_balance)
    }

    /// Balance left over when the ledger ran its whole nominal term without
    /// reaching zero. Ledgers that close early have no residual.
    pub fn rounding_residual(&self) -> Option<Money> {
        let balance = self.closing_balance();
        (self.months_to_close() == self.nominal_months && balance > Decimal::ZERO)
            .then_some(balance)
    }

    /// Informational text explaining a rounding residual, if there is one.
    pub fn rounding_note(&self) -> Option<String> {
        self.rounding_residual().map(|residual| {
            format!(
                "A balance of {} remains after the final EMI because interest and principal \
                 are rounded to whole rupees every month.",
                format_currency_display(residual)
            )
        })
    }

    /// Compares this ledger against the nominal headline figures.
    ///
    /// # Arguments
    ///
    /// * `nominal` - The summary computed from the same loan parameters.
    pub fn savings(&self, nominal: &LoanSummary) -> PrepaymentSavings {
        let adjusted_total = self.total_payments() + self.total_adjustments();
        PrepaymentSavings {
            nominal_total: nominal.total_payment,
            adjusted_total,
            amount_saved: nominal.total_payment - adjusted_total,
            interest_saved: nominal.total_interest - self.total_interest(),
            months_saved: self.nominal_months.saturating_sub(self.months_to_close()),
        }
    }
}

/// Builds the month-by-month ledger of a loan and its yearly aggregation.
///
/// Each month, interest on the running balance and the principal part of
/// the EMI are rounded to whole rupees, then the prepayment for that month
/// (rounded as well) is applied. A prepayment larger than what remains is
/// honoured up to the remaining balance and closes the loan. The ledger
/// stops as soon as the balance reaches zero.
///
/// # Arguments
///
/// * `params` - Validated loan parameters.
/// * `prepayments` - One-off prepayments keyed by period; may be empty.
///
/// # Errors
///
/// Returns an error if the parameters are invalid or the EMI cannot be computed.
#[instrument(skip(prepayments), fields(adjustments = prepayments.len()))]
pub fn build_amortization_schedule(
    params: &LoanParameters,
    prepayments: &AdjustmentMap,
) -> CalcResult<AmortizationSchedule> {
    params.validate()?;

    let rate = params.monthly_rate();
    let emi = params.rounded_emi()?;
    let nominal_months = simulated_months(term_months(params.term_years)?)?;

    let mut balance = params.principal;
    let mut monthly = Vec::with_capacity(nominal_months as usize);

    for month in 1..=nominal_months {
        if balance <= Decimal::ZERO {
            break;
        }

        let period = PeriodKey::from_month_index(month)?;
        let interest = balance
            .checked_mul(rate)
            .map(round_unit)
            .ok_or_else(|| CalcError::overflow("amortization ledger"))?;
        let mut principal = round_unit(emi - interest).max(Decimal::ZERO);
        let mut prepayment = round_unit(prepayments.get(&period));

        if balance < principal + prepayment {
            prepayment = prepayment.min(balance);
            principal = (balance - prepayment).max(Decimal::ZERO);
        }

        let opening_balance = balance;
        balance = (balance - principal - prepayment).max(Decimal::ZERO);

        trace!(month, %interest, %principal, %prepayment, %balance, "amortized month");

        monthly.push(AmortizationRow {
            month,
            year: period.year(),
            month_in_year: period.month(),
            opening_balance,
            period_payment: principal + interest,
            interest_component: interest,
            principal_component: principal,
            adjustment: prepayment,
            closing_balance: balance,
        });

        if balance.is_zero() {
            if month < nominal_months {
                debug!(month, nominal_months, "loan retired ahead of term");
            }
            break;
        }
    }

    let yearly = group_by_year(&monthly)
        .filter_map(AmortizationYear::from_months)
        .collect();

    let schedule = AmortizationSchedule {
        emi,
        nominal_months,
        monthly,
        yearly,
    };

    if let Some(residual) = schedule.rounding_residual() {
        warn!(%residual, "rounding left a balance after the nominal term");
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn car_loan() -> LoanParameters {
        LoanParameters::new(dec!(800000), dec!(9.5), dec!(5)).unwrap()
    }

    fn key(year: u32, month: u32) -> PeriodKey {
        PeriodKey::new(year, month).unwrap()
    }

    #[test]
    fn test_first_month_of_small_loan() {
        let params = LoanParameters::new(dec!(12000), dec!(12), dec!(1)).unwrap();
        let schedule = AmortizationSchedule::nominal(&params).unwrap();

        assert_eq!(schedule.emi, dec!(1066));
        assert_eq!(
            schedule.monthly[0],
            AmortizationRow {
                month: 1,
                year: 1,
                month_in_year: 1,
                opening_balance: dec!(12000),
                period_payment: dec!(1066),
                interest_component: dec!(120),
                principal_component: dec!(946),
                adjustment: dec!(0),
                closing_balance: dec!(11054),
            }
        );
        assert_eq!(schedule.monthly.len(), 12);
        assert_eq!(schedule.closing_balance(), dec!(4));
    }

    #[test]
    fn test_car_loan_yearly_rows() {
        let schedule = AmortizationSchedule::nominal(&car_loan()).unwrap();

        assert_eq!(schedule.yearly.len(), 5);
        assert_eq!(
            schedule.yearly[0],
            AmortizationYear {
                year: 1,
                opening_balance: dec!(800000),
                yearly_payment: dec!(201612),
                yearly_interest: dec!(70382),
                yearly_principal: dec!(131230),
                yearly_adjustment: dec!(0),
                closing_balance: dec!(668770),
                months: 12,
            }
        );
        assert_eq!(schedule.yearly[4].opening_balance, dec!(191640));
        assert_eq!(schedule.yearly[4].closing_balance, dec!(33));
    }

    #[test]
    fn test_rounding_residual_after_full_term() {
        let schedule = AmortizationSchedule::nominal(&car_loan()).unwrap();

        assert_eq!(schedule.months_to_close(), 60);
        assert_eq!(schedule.rounding_residual(), Some(dec!(33)));
        let note = schedule.rounding_note().unwrap();
        assert!(note.contains("₹33.00"));
    }

    #[test]
    fn test_mid_term_prepayment_shortens_loan() {
        let prepayments = AdjustmentMap::new().with(key(2, 6), dec!(100000)).unwrap();
        let schedule = build_amortization_schedule(&car_loan(), &prepayments).unwrap();

        assert_eq!(schedule.months_to_close(), 52);
        assert_eq!(schedule.total_interest(), dec!(172677));
        assert_eq!(schedule.closing_balance(), dec!(0));
        assert_eq!(schedule.rounding_residual(), None);

        assert_eq!(schedule.yearly[1].yearly_adjustment, dec!(100000));
        assert_eq!(schedule.yearly[1].closing_balance, dec!(419672));
        assert_eq!(schedule.yearly[4].months, 4);
        assert_eq!(schedule.yearly[4].closing_balance, dec!(0));
    }

    #[test]
    fn test_savings_against_nominal_summary() {
        let params = car_loan();
        let summary = LoanSummary::compute(&params).unwrap();
        let prepayments = AdjustmentMap::new().with(key(2, 6), dec!(100000)).unwrap();
        let schedule = build_amortization_schedule(&params, &prepayments).unwrap();

        let savings = schedule.savings(&summary);
        assert_eq!(savings.nominal_total, dec!(1008060));
        assert_eq!(savings.adjusted_total, dec!(972677));
        assert_eq!(savings.amount_saved, dec!(35383));
        assert_eq!(savings.interest_saved, dec!(35383));
        assert_eq!(savings.months_saved, 8);
    }

    #[test]
    fn test_overpayment_is_capped_at_remaining_balance() {
        let prepayments = AdjustmentMap::new().with(key(1, 3), dec!(900000)).unwrap();
        let schedule = build_amortization_schedule(&car_loan(), &prepayments).unwrap();

        assert_eq!(schedule.monthly.len(), 3);
        let last = &schedule.monthly[2];
        assert_eq!(last.opening_balance, dec!(778981));
        assert_eq!(last.interest_component, dec!(6167));
        assert_eq!(last.principal_component, dec!(0));
        assert_eq!(last.period_payment, dec!(6167));
        assert_eq!(last.adjustment, dec!(778981));
        assert_eq!(last.closing_balance, dec!(0));

        assert_eq!(schedule.yearly.len(), 1);
        assert_eq!(schedule.yearly[0].months, 3);
    }

    #[test]
    fn test_prepayment_amounts_are_rounded() {
        let prepayments = AdjustmentMap::new().with(key(1, 1), dec!(1000.4)).unwrap();
        let schedule = build_amortization_schedule(&car_loan(), &prepayments).unwrap();
        assert_eq!(schedule.monthly[0].adjustment, dec!(1000));
        assert_eq!(schedule.monthly[0].closing_balance, dec!(788532));
    }

    #[test]
    fn test_rows_chain_balances() {
        let prepayments = AdjustmentMap::new()
            .with(key(1, 7), dec!(50000))
            .unwrap()
            .with(key(3, 12), dec!(120000))
            .unwrap();
        let schedule = build_amortization_schedule(&car_loan(), &prepayments).unwrap();

        let mut previous = dec!(800000);
        for row in &schedule.monthly {
            assert_eq!(row.opening_balance, previous);
            assert_eq!(
                row.closing_balance,
                row.opening_balance - row.principal_component - row.adjustment
            );
            assert!(row.closing_balance >= Decimal::ZERO);
            assert!(row.principal_component >= Decimal::ZERO);
            previous = row.closing_balance;
        }
    }

    #[test]
    fn test_yearly_rows_sum_monthly_rows() {
        let prepayments = AdjustmentMap::new().with(key(2, 3), dec!(70000)).unwrap();
        let schedule = build_amortization_schedule(&car_loan(), &prepayments).unwrap();

        for year in &schedule.yearly {
            let months: Vec<_> = schedule.monthly.iter().filter(|r| r.year == year.year).collect();
            let interest: Decimal = months.iter().map(|r| r.interest_component).sum();
            let principal: Decimal = months.iter().map(|r| r.principal_component).sum();
            assert_eq!(year.yearly_interest, interest);
            assert_eq!(year.yearly_principal, principal);
            assert_eq!(year.yearly_payment, interest + principal);
            assert_eq!(year.closing_balance, months.last().unwrap().closing_balance);
        }
    }

    #[test]
    fn test_fractional_term_runs_whole_months() {
        let params = LoanParameters::new(dec!(100000), dec!(10), dec!(1.25)).unwrap();
        let schedule = AmortizationSchedule::nominal(&params).unwrap();

        assert_eq!(schedule.nominal_months, 15);
        assert_eq!(schedule.yearly.len(), 2);
        assert_eq!(schedule.yearly[1].months, 3);
    }
}

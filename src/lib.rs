//! `in_financial` is a Rust library behind a set of Indian rupee calculators:
//! loan EMI, loan amortization with prepayments, and SIP growth with
//! withdrawals.
//!
//! It provides:
//! - **Loan math primitives**: EMI, total payment and total interest.
//! - **Amortization schedules**: a month-by-month ledger of a loan, with
//!   optional one-off prepayments, aggregated into yearly rows.
//! - **Growth schedules**: the symmetric ledger of a monthly investment
//!   plan, with optional one-off withdrawals.
//! - **Currency helpers**: Indian digit grouping (`12,34,567`), rupee
//!   display strings and amounts in words on the lakh/crore scale.
//! - **Calculator presets**: input bounds and defaults per calculator.
//!
//! Every figure in a schedule is rounded to a whole rupee in the month it is
//! computed, so the rows always add up. Headline figures come from the
//! closed-form formulas over the nominal term.
//!
//! ## Usage
//!
//! Add `in_financial` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! in_financial = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then compute the headline figures and the ledger of a loan:
//!
//! ```rust
//! use in_financial::{
//!     amount_in_words, build_amortization_schedule, format_currency_display, AdjustmentMap,
//!     CalcError, LoanParameters, LoanSummary, PeriodKey,
//! };
//! use rust_decimal_macros::dec;
//!
//! fn main() -> Result<(), CalcError> {
//!     let params = LoanParameters::new(dec!(800_000), dec!(9.5), dec!(5))?;
//!     let summary = LoanSummary::compute(&params)?;
//!     let emi = format_currency_display(summary.emi);
//!     println!("EMI: {emi} ({})", amount_in_words(summary.emi));
//!     println!("Total payable: {}", format_currency_display(summary.total_payment));
//!
//!     let mut prepayments = AdjustmentMap::new();
//!     prepayments.insert(PeriodKey::new(2, 6)?, dec!(100_000))?;
//!
//!     let schedule = build_amortization_schedule(&params, &prepayments)?;
//!     for year in &schedule.yearly {
//!         let closing = format_currency_display(year.closing_balance);
//!         println!("Year {}: closing {closing}", year.year);
//!     }
//!
//!     let savings = schedule.savings(&summary);
//!     assert_eq!(savings.months_saved, 8);
//!     Ok(())
//! }
//! ```

pub mod amortization;
pub mod currency;
pub mod error;
pub mod growth;
pub mod loan;
pub mod period;
pub mod presets;
pub mod types;

pub use amortization::{
    build_amortization_schedule, AmortizationRow, AmortizationSchedule, AmortizationYear,
    PrepaymentSavings,
};
pub use currency::{
    amount_in_words, format_currency_display, format_grouped_input, number_to_words, parse_amount,
};
pub use error::CalcError;
pub use growth::{
    build_growth_schedule, compute_future_value, GrowthParameters, GrowthRow, GrowthSchedule,
    GrowthSummary, GrowthYear, WithdrawalImpact,
};
pub use loan::{
    compute_emi, compute_total_interest, compute_total_payment, LoanParameters, LoanSummary,
};
pub use period::{AdjustmentMap, PeriodKey, PeriodRow};
pub use presets::{Bounds, CalculatorKind, CalculatorPreset, PresetCatalog};
pub use types::{Money, Rate, Years};

/// Result type used throughout the engine.
pub type CalcResult<T> = Result<T, CalcError>;

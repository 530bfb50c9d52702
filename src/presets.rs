//! Calculator presets: input bounds and defaults for each calculator page.
//!
//! The built-in catalog covers the generic EMI calculator, the four loan
//! products and the SIP calculator. A catalog can also be loaded from JSON
//! to override them wholesale.

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CalcError;
use crate::growth::GrowthParameters;
use crate::loan::LoanParameters;
use crate::types::{Money, Rate, Years};
use crate::CalcResult;

/// The calculators the presets describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorKind {
    LoanEmi,
    HomeLoan,
    CarLoan,
    EducationLoan,
    PersonalLoan,
    Sip,
}

impl CalculatorKind {
    /// Whether the calculator simulates a loan (as opposed to an investment plan).
    pub fn is_loan(&self) -> bool {
        !matches!(self, CalculatorKind::Sip)
    }
}

/// An inclusive range of accepted input values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest accepted value.
    pub min: Decimal,
    /// Largest accepted value.
    pub max: Decimal,
}

impl Bounds {
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }

    /// # Errors
    ///
    /// Returns `CalcError::OutOfRange` naming `field` when `value` falls outside the bounds.
    pub fn check(&self, field: &str, value: Decimal) -> CalcResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(CalcError::OutOfRange {
                field: field.into(),
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Bounds and defaults for one calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorPreset {
    /// Which calculator the preset configures.
    pub kind: CalculatorKind,
    /// Page heading.
    pub title: String,
    /// Loan amount, or monthly investment for the SIP calculator.
    pub amount: Bounds,
    /// Annual rate in percent.
    pub interest: Bounds,
    /// Term in years.
    pub term: Bounds,
    /// Amount the page opens with.
    pub default_amount: Money,
    /// Rate the page opens with.
    pub default_interest: Rate,
    /// Term the page opens with.
    pub default_term: Years,
}

impl CalculatorPreset {
    fn builtin(
        kind: CalculatorKind,
        title: &str,
        amount: Bounds,
        interest: Bounds,
        term: Bounds,
        defaults: (Money, Rate, Years),
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            amount,
            interest,
            term,
            default_amount: defaults.0,
            default_interest: defaults.1,
            default_term: defaults.2,
        }
    }

    /// The loan the calculator starts with.
    pub fn loan_parameters_default(&self) -> CalcResult<LoanParameters> {
        LoanParameters::new(self.default_amount, self.default_interest, self.default_term)
    }

    /// The plan the calculator starts with.
    pub fn growth_parameters_default(&self) -> CalcResult<GrowthParameters> {
        GrowthParameters::new(self.default_amount, self.default_interest, self.default_term)
    }

    /// Checks loan parameters against this preset's bounds.
    ///
    /// # Errors
    ///
    /// Returns `CalcError::OutOfRange` for the first value outside its bounds.
    pub fn validate_loan(&self, params: &LoanParameters) -> CalcResult<()> {
        self.amount.check("principal", params.principal)?;
        self.interest
            .check("annual_rate_percent", params.annual_rate_percent)?;
        self.term.check("term_years", params.term_years)
    }

    /// Checks plan parameters against this preset's bounds.
    ///
    /// # Errors
    ///
    /// Returns `CalcError::OutOfRange` for the first value outside its bounds.
    pub fn validate_growth(&self, params: &GrowthParameters) -> CalcResult<()> {
        self.amount
            .check("periodic_contribution", params.periodic_contribution)?;
        self.interest
            .check("annual_rate_percent", params.annual_rate_percent)?;
        self.term.check("term_years", params.term_years)
    }
}

/// The set of presets available to the calculator pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetCatalog {
    /// Presets in display order.
    pub presets: Vec<CalculatorPreset>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        use CalculatorKind::*;

        Self {
            presets: vec![
                CalculatorPreset::builtin(
                    LoanEmi,
                    "Loan EMI Calculator",
                    Bounds::new(dec!(10000), dec!(10000000)),
                    Bounds::new(dec!(1), dec!(30)),
                    Bounds::new(dec!(1), dec!(30)),
                    (dec!(5000000), dec!(9), dec!(15)),
                ),
                CalculatorPreset::builtin(
                    HomeLoan,
                    "Home Loan Calculator",
                    Bounds::new(dec!(100000), dec!(50000000)),
                    Bounds::new(dec!(6.5), dec!(12)),
                    Bounds::new(dec!(5), dec!(30)),
                    (dec!(3000000), dec!(8.5), dec!(20)),
                ),
                CalculatorPreset::builtin(
                    CarLoan,
                    "Car Loan Calculator",
                    Bounds::new(dec!(100000), dec!(10000000)),
                    Bounds::new(dec!(7), dec!(15)),
                    Bounds::new(dec!(1), dec!(7)),
                    (dec!(800000), dec!(9.5), dec!(5)),
                ),
                CalculatorPreset::builtin(
                    EducationLoan,
                    "Education Loan Calculator",
                    Bounds::new(dec!(50000), dec!(10000000)),
                    Bounds::new(dec!(7.5), dec!(14)),
                    Bounds::new(dec!(3), dec!(15)),
                    (dec!(1000000), dec!(8.5), dec!(7)),
                ),
                CalculatorPreset::builtin(
                    PersonalLoan,
                    "Personal Loan Calculator",
                    Bounds::new(dec!(10000), dec!(2000000)),
                    Bounds::new(dec!(8), dec!(24)),
                    Bounds::new(dec!(1), dec!(5)),
                    (dec!(500000), dec!(14), dec!(3)),
                ),
                CalculatorPreset::builtin(
                    Sip,
                    "SIP Calculator",
                    Bounds::new(dec!(500), dec!(100000)),
                    Bounds::new(dec!(1), dec!(30)),
                    Bounds::new(dec!(1), dec!(50)),
                    (dec!(10000), dec!(9), dec!(20)),
                ),
            ],
        }
    }
}

impl PresetCatalog {
    pub fn get(&self, kind: CalculatorKind) -> Option<&CalculatorPreset> {
        self.presets.iter().find(|preset| preset.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalculatorPreset> {
        self.presets.iter()
    }

    /// Parses a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a preset's defaults fall
    /// outside its own bounds.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let catalog: Self = serde_json::from_str(json).context("Failed to parse preset catalog")?;
        catalog.check_defaults()?;
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preset catalog {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid preset catalog {}", path.display()))
    }

    pub fn to_json_string(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check_defaults(&self) -> anyhow::Result<()> {
        for preset in &self.presets {
            let result = if preset.kind.is_loan() {
                preset
                    .loan_parameters_default()
                    .and_then(|params| preset.validate_loan(&params))
            } else {
                preset
                    .growth_parameters_default()
                    .and_then(|params| preset.validate_growth(&params))
            };
            result.with_context(|| format!("Preset {:?} has invalid defaults", preset.title))?;
        }
        Ok(())
    }
}

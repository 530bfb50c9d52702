//! Period keys and the sparse maps of one-off adjustments keyed by them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;
use crate::types::Money;
use crate::CalcResult;

const MONTHS_PER_YEAR: u32 = 12;

/// A month of a schedule, addressed as (year of the term, month within that year).
///
/// Years start at 1 and months run `1..=12`. Keys display and parse as
/// `"<year>-<month>"`; a bare `"<year>"` addresses the last month of that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: u32,
    month: u32,
}

impl PeriodKey {
    /// # Errors
    ///
    /// Returns `CalcError::InvalidPeriod` if `year` is zero or `month` is not in `1..=12`.
    pub fn new(year: u32, month: u32) -> CalcResult<Self> {
        if year == 0 {
            return Err(CalcError::InvalidPeriod(format!(
                "year must start at 1, got {year}"
            )));
        }
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(CalcError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The key for month 12 of `year`, where yearly adjustment cells land.
    pub fn year_end(year: u32) -> CalcResult<Self> {
        Self::new(year, MONTHS_PER_YEAR)
    }

    /// Derives the key for the 1-based sequential month of a term:
    /// `year = ceil(index / 12)`, `month = index % 12` (or 12).
    pub fn from_month_index(index: u32) -> CalcResult<Self> {
        if index == 0 {
            return Err(CalcError::InvalidPeriod("month index starts at 1".into()));
        }
        let year = index.div_ceil(MONTHS_PER_YEAR);
        let month = match index % MONTHS_PER_YEAR {
            0 => MONTHS_PER_YEAR,
            m => m,
        };
        Ok(Self { year, month })
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The 1-based sequential month this key addresses, or `None` when it
    /// does not fit a `u32`.
    pub fn month_index(&self) -> Option<u32> {
        (self.year - 1)
            .checked_mul(MONTHS_PER_YEAR)?
            .checked_add(self.month)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| CalcError::InvalidPeriod(format!("cannot parse period key {s:?}")))
        };
        match s.split_once('-') {
            Some((year, month)) => Self::new(parse(year)?, parse(month)?),
            None => Self::year_end(parse(s)?),
        }
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

/// A row of a monthly ledger.
pub trait PeriodRow {
    /// Year of the term the row falls in, starting at 1.
    fn year(&self) -> u32;
}

/// Splits consecutive monthly rows into runs that share a year.
///
/// Each run holds at most 12 rows; the last run is shorter when the ledger
/// stops early or the term ends mid-year.
pub(crate) fn group_by_year<R: PeriodRow>(rows: &[R]) -> impl Iterator<Item = &[R]> {
    rows.chunk_by(|a, b| a.year() == b.year())
}

/// Sparse one-off adjustments (prepayments or withdrawals) keyed by period.
///
/// Absent keys mean no adjustment. Amounts are never negative and zero
/// amounts are not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<PeriodKey, Money>",
    into = "BTreeMap<PeriodKey, Money>"
)]
pub struct AdjustmentMap {
    entries: BTreeMap<PeriodKey, Money>,
}

impl AdjustmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the adjustment for a period, returning the previous amount.
    ///
    /// Setting zero clears the entry.
    ///
    /// # Errors
    ///
    /// Returns `CalcError::InvalidInput` for a negative amount.
    pub fn insert(&mut self, key: PeriodKey, amount: Money) -> CalcResult<Option<Money>> {
        if amount < Decimal::ZERO {
            return Err(CalcError::InvalidInput {
                field: format!("adjustment {key}"),
                reason: "cannot be negative".into(),
            });
        }
        if amount.is_zero() {
            return Ok(self.entries.remove(&key));
        }
        Ok(self.entries.insert(key, amount))
    }

    /// Sets a yearly adjustment, which applies in month 12 of that year.
    pub fn insert_yearly(&mut self, year: u32, amount: Money) -> CalcResult<Option<Money>> {
        self.insert(PeriodKey::year_end(year)?, amount)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: PeriodKey, amount: Money) -> CalcResult<Self> {
        self.insert(key, amount)?;
        Ok(self)
    }

    pub fn remove(&mut self, key: &PeriodKey) -> Option<Money> {
        self.entries.remove(key)
    }

    /// The adjustment for a period, zero when absent.
    pub fn get(&self, key: &PeriodKey) -> Money {
        self.entries.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in period order.
    pub fn iter(&self) -> impl Iterator<Item = (&PeriodKey, &Money)> {
        self.entries.iter()
    }

    /// Sum of all adjustments in the map.
    pub fn total(&self) -> Money {
        self.entries.values().copied().sum()
    }
}

impl TryFrom<BTreeMap<PeriodKey, Money>> for AdjustmentMap {
    type Error = CalcError;

    fn try_from(entries: BTreeMap<PeriodKey, Money>) -> Result<Self, Self::Error> {
        entries
            .into_iter()
            .try_fold(Self::new(), |map, (key, amount)| map.with(key, amount))
    }
}

impl From<AdjustmentMap> for BTreeMap<PeriodKey, Money> {
    fn from(map: AdjustmentMap) -> Self {
        map.entries
    }
}

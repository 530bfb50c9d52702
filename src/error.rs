use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the calculation engine.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("Invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("{field} = {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        field: String,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalcError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: &str) -> Self {
        CalcError::Overflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::Serialization(e.to_string())
    }
}

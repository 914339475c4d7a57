//! Error types for the planning engine

use thiserror::Error;

/// Result alias used across the calculators
pub type PlanningResult<T> = Result<T, PlanningError>;

/// Errors raised by the calculation engine
///
/// Every failure is a caller bug (bad input shape). Nothing here is transient,
/// so there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// Negative income, malformed age ordering, non-positive loan terms, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PlanningError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PlanningError::InvalidInput(message.into())
    }
}

/// Boundary validation failures for client records and financial inputs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: String, value: f64 },

    #[error("{field} must be a finite number")]
    NonFinite { field: String },

    #[error("retirement age {retirement_age} must be greater than current age {current_age}")]
    AgeOrdering { current_age: u32, retirement_age: u32 },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("liability '{lender}': term remaining {term_remaining} exceeds loan term {loan_term}")]
    TermExceedsLoanTerm {
        lender: String,
        term_remaining: f64,
        loan_term: f64,
    },

    #[error("'{name}': an outstanding balance requires a positive remaining term")]
    MissingTerm { name: String },

    #[error("'{name}': loan term of {term} years exceeds {max} years")]
    TermTooLong { name: String, term: f64, max: f64 },

    #[error("{field} is invalid: {reason}")]
    InvalidDate { field: String, reason: String },
}

impl From<ValidationError> for PlanningError {
    fn from(err: ValidationError) -> Self {
        PlanningError::InvalidInput(err.to_string())
    }
}

/// Check that a monetary field is finite and non-negative
pub(crate) fn check_amount(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts_to_invalid_input() {
        let err: PlanningError = ValidationError::AgeOrdering {
            current_age: 65,
            retirement_age: 60,
        }
        .into();

        match err {
            PlanningError::InvalidInput(msg) => {
                assert!(msg.contains("retirement age 60"), "unexpected message: {}", msg)
            }
        }
    }

    #[test]
    fn test_check_amount() {
        assert!(check_amount("annualIncome", 0.0).is_ok());
        assert!(matches!(
            check_amount("annualIncome", -1.0),
            Err(ValidationError::NegativeAmount { .. })
        ));
        assert!(matches!(
            check_amount("annualIncome", f64::NAN),
            Err(ValidationError::NonFinite { .. })
        ));
    }
}

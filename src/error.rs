use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsolidationError>;

/// Reasons a single evaluation is rejected.
///
/// Every variant describes input the engine refuses to compute with; no
/// partially populated output is ever returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsolidationError {
    #[error("term must be at least one month, got {months}")]
    InvalidTerm { months: u32 },

    #[error("payment ${payment:.2} {shortfall}")]
    NonTerminatingPayment { payment: f64, shortfall: Shortfall },

    #[error("payment ${payment:.2} is below the minimum payment of ${minimum:.2}")]
    InsufficientOverridePayment { payment: f64, minimum: f64 },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("debt name {name:?} is used more than once")]
    DuplicateDebtName { name: String },

    #[error("no debt named {name:?} in the portfolio")]
    UnknownDebt { name: String },
}

/// Why a revolving payment fails to clear its balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shortfall {
    /// The payment is at or below the first month's interest.
    BelowInterest { monthly_interest: f64 },
    /// Still owing after the configured month cap.
    MonthCap { months: u32 },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortfall::BelowInterest { monthly_interest } => write!(
                f,
                "does not cover monthly interest of ${:.2}; the balance would never be repaid",
                monthly_interest
            ),
            Shortfall::MonthCap { months } => {
                write!(f, "does not repay the balance within {} months", months)
            }
        }
    }
}

impl ConsolidationError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        ConsolidationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Rejects negative and non-finite amounts and rates.
pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ConsolidationError::invalid_input(field, "must be a finite number"));
    }
    if value < 0. {
        return Err(ConsolidationError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

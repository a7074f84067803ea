use log::{debug, trace};
use std::fmt;

use crate::error::{check_non_negative, ConsolidationError, Result, Shortfall};
use crate::rate::{revolving_monthly_rate, DAYS_PER_MONTH, DAYS_PER_YEAR};
use crate::round;

/// Minimum-payment rule for a credit line: a percentage of the balance, but
/// never less than a fixed floor.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaymentPolicy {
    /// Percent of the balance, e.g. 3.0 for 3%.
    pub min_payment_percent: f64,
    pub fixed_min_payment: f64,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            min_payment_percent: 3.,
            fixed_min_payment: 10.,
        }
    }
}

impl PaymentPolicy {
    pub fn new(min_payment_percent: f64, fixed_min_payment: f64) -> Self {
        Self {
            min_payment_percent,
            fixed_min_payment,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("minimum payment percent", self.min_payment_percent)?;
        check_non_negative("fixed minimum payment", self.fixed_min_payment)
    }

    pub fn minimum_payment(&self, balance: f64) -> f64 {
        (balance * (self.min_payment_percent / 100.)).max(self.fixed_min_payment)
    }
}

/// Payment actually used for a revolving debt: the policy minimum, or an
/// override that must be at least that minimum.
pub fn resolve_payment(balance: f64, policy: &PaymentPolicy, override_payment: Option<f64>) -> Result<f64> {
    let minimum = policy.minimum_payment(balance);
    match override_payment {
        None => Ok(minimum),
        Some(payment) if payment.is_nan() || payment < minimum => {
            Err(ConsolidationError::InsufficientOverridePayment { payment, minimum })
        }
        Some(payment) => Ok(payment),
    }
}

/// Outcome of the daily-accrual payoff simulation.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorrowingCost {
    /// Interest paid until the balance is cleared, to the cent.
    pub total_interest: f64,
    /// Billing months simulated, including the one in which the balance
    /// was cleared.
    pub months: u32,
}

/// Interest paid on a revolving balance repaid with a fixed monthly payment,
/// accruing daily at `annual_rate / 365` over thirty-day months.
///
/// Within a month interest compounds daily; as soon as the payment covers the
/// accrued balance the debt is treated as cleared mid-month. Otherwise the
/// payment is applied at month end.
///
/// A payment that cannot cover the first month's interest never clears the
/// balance and is rejected up front; `max_months` bounds every other input.
pub fn borrowing_cost_daily(
    balance: f64,
    annual_rate: f64,
    monthly_payment: f64,
    max_months: u32,
) -> Result<BorrowingCost> {
    check_non_negative("balance", balance)?;
    check_non_negative("annual rate", annual_rate)?;
    check_non_negative("monthly payment", monthly_payment)?;

    if balance == 0. {
        return Ok(BorrowingCost {
            total_interest: 0.,
            months: 0,
        });
    }

    let monthly_interest = balance * revolving_monthly_rate(annual_rate);
    if monthly_payment <= monthly_interest {
        return Err(ConsolidationError::NonTerminatingPayment {
            payment: monthly_payment,
            shortfall: Shortfall::BelowInterest { monthly_interest },
        });
    }

    let daily_rate = annual_rate / DAYS_PER_YEAR;
    let mut total_interest = 0.;
    let mut remaining = balance;
    let mut months = 0;

    while remaining > 0. {
        if months == max_months {
            return Err(ConsolidationError::NonTerminatingPayment {
                payment: monthly_payment,
                shortfall: Shortfall::MonthCap { months: max_months },
            });
        }
        months += 1;

        let mut month_interest = 0.;
        for _ in 0..DAYS_PER_MONTH {
            let day_interest = remaining * daily_rate;
            month_interest += day_interest;
            remaining += day_interest;

            if monthly_payment >= remaining {
                remaining = 0.;
                break;
            }
        }
        total_interest += month_interest;

        if remaining > 0. {
            remaining = (remaining - monthly_payment.min(remaining)).max(0.);
        }
        trace!(
            "revolving month {}, interest {}, balance {}",
            months,
            month_interest,
            remaining
        );
    }

    Ok(BorrowingCost {
        total_interest: round(total_interest, 2),
        months,
    })
}

/// A credit line without a fixed term.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RevolvingDebt {
    pub balance: f64,
    pub annual_rate: f64,
    /// Falls back to the engine's default policy when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub policy: Option<PaymentPolicy>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub override_payment: Option<f64>,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RevolvingSummary {
    pub minimum_payment: f64,
    pub monthly_payment: f64,
    pub custom_payment_used: bool,
    pub total_interest: f64,
    pub payoff_months: u32,
}

impl RevolvingDebt {
    pub fn new(balance: f64, annual_rate: f64) -> Self {
        Self {
            balance,
            annual_rate,
            policy: None,
            override_payment: None,
        }
    }

    pub fn with_policy(mut self, policy: PaymentPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_payment(mut self, payment: f64) -> Self {
        self.override_payment = Some(payment);
        self
    }

    pub fn evaluate(&self, default_policy: &PaymentPolicy, max_months: u32) -> Result<RevolvingSummary> {
        check_non_negative("balance", self.balance)?;
        check_non_negative("annual rate", self.annual_rate)?;
        let policy = self.policy.as_ref().unwrap_or(default_policy);
        policy.validate()?;

        let minimum_payment = policy.minimum_payment(self.balance);
        let monthly_payment = resolve_payment(self.balance, policy, self.override_payment)?;
        let cost = borrowing_cost_daily(self.balance, self.annual_rate, monthly_payment, max_months)?;

        let summary = RevolvingSummary {
            minimum_payment,
            monthly_payment,
            custom_payment_used: self.override_payment.is_some(),
            total_interest: cost.total_interest,
            payoff_months: cost.months,
        };
        debug!("{}", summary);
        Ok(summary)
    }
}

impl fmt::Display for RevolvingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payment ${:.2}{}, total interest ${:.2}, paid off in {} months",
            self.monthly_payment,
            if self.custom_payment_used { " (custom)" } else { "" },
            self.total_interest,
            self.payoff_months
        )
    }
}

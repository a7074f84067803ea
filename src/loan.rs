use chrono::{Datelike, NaiveDate};
use log::{debug, trace};
use std::fmt;

use crate::error::{check_non_negative, ConsolidationError, Result};
use crate::rate::{periodic_rate, Compounding};

/// Level payment of an amortizing loan together with the periodic rate it was
/// derived from.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyPayment {
    pub amount: f64,
    pub periodic_rate: f64,
}

/// Monthly payment for `principal` repaid over `months` at a nominal
/// `annual_rate` compounded semi-annually.
pub fn monthly_payment(principal: f64, annual_rate: f64, months: u32) -> Result<MonthlyPayment> {
    amortizing_payment(principal, annual_rate, months, Compounding::SemiAnnually)
}

pub fn amortizing_payment(
    principal: f64,
    annual_rate: f64,
    months: u32,
    compounding: Compounding,
) -> Result<MonthlyPayment> {
    if months == 0 {
        return Err(ConsolidationError::InvalidTerm { months });
    }

    let pmt_rate = periodic_rate(annual_rate, compounding);

    // interest-free: straight division, the annuity formula would divide by zero
    if pmt_rate == 0. {
        return Ok(MonthlyPayment {
            amount: principal / months as f64,
            periodic_rate: 0.,
        });
    }

    let amount = principal * (pmt_rate / (1. - (1. + pmt_rate).powf(-(months as f64))));
    Ok(MonthlyPayment {
        amount,
        periodic_rate: pmt_rate,
    })
}

/// Outstanding principal after `months_elapsed` level payments.
///
/// Never negative: once `months_elapsed` reaches `total_term` the loan is
/// considered repaid and the result is zero.
pub fn remaining_balance(
    principal: f64,
    annual_rate: f64,
    months_elapsed: u32,
    total_term: u32,
) -> Result<f64> {
    remaining_balance_with(
        principal,
        annual_rate,
        months_elapsed,
        total_term,
        Compounding::SemiAnnually,
    )
}

pub fn remaining_balance_with(
    principal: f64,
    annual_rate: f64,
    months_elapsed: u32,
    total_term: u32,
    compounding: Compounding,
) -> Result<f64> {
    if total_term == 0 {
        return Err(ConsolidationError::InvalidTerm { months: total_term });
    }
    if months_elapsed >= total_term {
        return Ok(0.);
    }

    let pmt = amortizing_payment(principal, annual_rate, total_term, compounding)?;
    let balance = if pmt.periodic_rate == 0. {
        principal * (1. - months_elapsed as f64 / total_term as f64)
    } else {
        let growth = (1. + pmt.periodic_rate).powf(months_elapsed as f64);
        principal * growth - (pmt.amount / pmt.periodic_rate) * (growth - 1.)
    };
    Ok(balance.max(0.))
}

/// Interest paid over `months` level payments. Zero for a zero-month term.
pub fn total_interest(principal: f64, annual_rate: f64, months: u32) -> Result<f64> {
    total_interest_with(principal, annual_rate, months, Compounding::SemiAnnually)
}

pub fn total_interest_with(
    principal: f64,
    annual_rate: f64,
    months: u32,
    compounding: Compounding,
) -> Result<f64> {
    if months == 0 {
        return Ok(0.);
    }
    let pmt = amortizing_payment(principal, annual_rate, months, compounding)?;
    Ok(pmt.amount * months as f64 - principal)
}

/// Whole calendar months from `start` to `as_of`, ignoring the day of month.
/// A start date in the future counts as zero.
pub fn months_elapsed(start: NaiveDate, as_of: NaiveDate) -> u32 {
    let months = (as_of.year() - start.year()) * 12 + as_of.month() as i32 - start.month() as i32;
    months.max(0) as u32
}

/// An installment loan with a level monthly payment.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedLoan {
    pub principal: f64,
    pub annual_rate: f64,
    pub term_months: u32,
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub compounding: Compounding,
}

/// Figures derived for a fixed loan at an evaluation date.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedLoanSummary {
    pub monthly_payment: f64,
    pub periodic_rate: f64,
    pub months_elapsed: u32,
    pub remaining_balance: f64,
    pub remaining_term_months: u32,
    pub remaining_interest: f64,
}

impl FixedLoan {
    pub fn new(principal: f64, annual_rate: f64, term_months: u32, start_date: NaiveDate) -> Self {
        Self {
            principal,
            annual_rate,
            term_months,
            start_date,
            compounding: Compounding::default(),
        }
    }

    pub fn with_compounding(mut self, compounding: Compounding) -> Self {
        self.compounding = compounding;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("balance", self.principal)?;
        check_non_negative("annual rate", self.annual_rate)?;
        if self.term_months == 0 {
            return Err(ConsolidationError::InvalidTerm { months: 0 });
        }
        Ok(())
    }

    pub fn evaluate(&self, as_of: NaiveDate) -> Result<FixedLoanSummary> {
        self.validate()?;

        let elapsed = months_elapsed(self.start_date, as_of);
        let remaining_term_months = self.term_months.saturating_sub(elapsed);
        let pmt = amortizing_payment(
            self.principal,
            self.annual_rate,
            self.term_months,
            self.compounding,
        )?;
        let remaining_balance = remaining_balance_with(
            self.principal,
            self.annual_rate,
            elapsed,
            self.term_months,
            self.compounding,
        )?;
        let remaining_interest = total_interest_with(
            remaining_balance,
            self.annual_rate,
            remaining_term_months,
            self.compounding,
        )?;
        trace!(
            "fixed loan elapsed {} of {} months, balance {} -> {}",
            elapsed,
            self.term_months,
            self.principal,
            remaining_balance
        );

        let summary = FixedLoanSummary {
            monthly_payment: pmt.amount,
            periodic_rate: pmt.periodic_rate,
            months_elapsed: elapsed,
            remaining_balance,
            remaining_term_months,
            remaining_interest,
        };
        debug!("{}", summary);
        Ok(summary)
    }
}

impl fmt::Display for FixedLoanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payment ${:.2}, periodic rate {:.4}%, remaining balance ${:.2}, remaining interest ${:.2}, remaining term {} months",
            self.monthly_payment,
            self.periodic_rate * 100.,
            self.remaining_balance,
            self.remaining_interest,
            self.remaining_term_months
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_rate_loan() {
        let pmt = monthly_payment(12000., 0., 12).unwrap();
        assert_eq!(pmt.amount, 1000.);
        assert_eq!(pmt.periodic_rate, 0.);
        assert_eq!(remaining_balance(12000., 0., 6, 12).unwrap(), 6000.);
        assert_eq!(remaining_balance(12000., 0., 12, 12).unwrap(), 0.);
        assert_eq!(total_interest(12000., 0., 12).unwrap(), 0.);
    }

    #[test]
    fn test_interest_bearing_loan() {
        let pmt = monthly_payment(10000., 0.06, 60).unwrap();
        assert_abs_diff_eq!(pmt.amount, 192.99, epsilon = 0.01);
        assert_abs_diff_eq!(pmt.periodic_rate, 0.0049386, epsilon = 1e-7);
        assert_abs_diff_eq!(total_interest(10000., 0.06, 60).unwrap(), 1579.14, epsilon = 0.01);
    }

    #[test]
    fn test_monthly_compounding_matches_textbook_payment() {
        let pmt = amortizing_payment(10000., 0.06, 60, Compounding::Monthly).unwrap();
        assert_abs_diff_eq!(pmt.amount, 193.33, epsilon = 0.01);
    }

    #[test]
    fn test_zero_term_is_rejected() {
        assert_eq!(
            monthly_payment(1000., 0.05, 0),
            Err(ConsolidationError::InvalidTerm { months: 0 })
        );
        assert_eq!(
            monthly_payment(1000., 0., 0),
            Err(ConsolidationError::InvalidTerm { months: 0 })
        );
        assert!(remaining_balance(1000., 0.05, 0, 0).is_err());
        assert_eq!(total_interest(1000., 0.05, 0).unwrap(), 0.);
    }

    #[test]
    fn test_balance_clamped_at_and_past_maturity() {
        assert_eq!(remaining_balance(200000., 0.05, 120, 120).unwrap(), 0.);
        assert_eq!(remaining_balance(200000., 0.05, 150, 120).unwrap(), 0.);
        assert_eq!(remaining_balance(5000., 0., 30, 24).unwrap(), 0.);
    }

    #[test]
    fn test_balance_is_non_increasing() {
        let mut previous = 25000.;
        for month in 0..=60 {
            let balance = remaining_balance(25000., 0.07, month, 60).unwrap();
            assert!(balance <= previous + 1e-9, "month {}", month);
            assert!(balance >= 0.);
            previous = balance;
        }
        assert_eq!(previous, 0.);
    }

    #[test]
    fn test_months_elapsed() {
        assert_eq!(months_elapsed(date(2024, 1, 15), date(2026, 10, 17)), 33);
        assert_eq!(months_elapsed(date(2024, 1, 31), date(2024, 2, 1)), 1);
        assert_eq!(months_elapsed(date(2024, 3, 1), date(2024, 3, 31)), 0);
        assert_eq!(months_elapsed(date(2023, 12, 1), date(2024, 1, 1)), 1);
        // start in the future
        assert_eq!(months_elapsed(date(2027, 1, 1), date(2026, 10, 17)), 0);
    }

    #[test]
    fn test_evaluate_car_loan() {
        let loan = FixedLoan::new(25000., 0.07, 60, date(2024, 1, 15));
        let summary = loan.evaluate(date(2026, 10, 17)).unwrap();

        assert_abs_diff_eq!(summary.monthly_payment, 493.85, epsilon = 0.01);
        assert_eq!(summary.months_elapsed, 33);
        assert_eq!(summary.remaining_term_months, 27);
        assert_abs_diff_eq!(summary.remaining_balance, 12317.79, epsilon = 0.01);
        assert_abs_diff_eq!(summary.remaining_interest, 1016.22, epsilon = 0.01);
    }

    #[test]
    fn test_evaluate_matured_loan() {
        let loan = FixedLoan::new(6000., 0.09, 24, date(2020, 5, 1));
        let summary = loan.evaluate(date(2026, 10, 17)).unwrap();

        assert_eq!(summary.remaining_term_months, 0);
        assert_eq!(summary.remaining_balance, 0.);
        assert_eq!(summary.remaining_interest, 0.);
    }

    #[test]
    fn test_evaluate_future_start() {
        let loan = FixedLoan::new(8000., 0.05, 36, date(2027, 2, 1));
        let summary = loan.evaluate(date(2026, 10, 17)).unwrap();

        assert_eq!(summary.months_elapsed, 0);
        assert_eq!(summary.remaining_term_months, 36);
        assert_eq!(summary.remaining_balance, 8000.);
    }

    #[test]
    fn test_evaluate_rejects_bad_input() {
        let as_of = date(2026, 10, 17);
        assert!(FixedLoan::new(-1., 0.05, 36, as_of).evaluate(as_of).is_err());
        assert!(FixedLoan::new(1000., -0.05, 36, as_of).evaluate(as_of).is_err());
        assert_eq!(
            FixedLoan::new(1000., 0.05, 0, as_of).evaluate(as_of),
            Err(ConsolidationError::InvalidTerm { months: 0 })
        );
    }

    #[test]
    fn test_summary_display() {
        let loan = FixedLoan::new(12000., 0., 12, date(2026, 4, 1));
        let summary = loan.evaluate(date(2026, 10, 17)).unwrap();
        assert_eq!(
            summary.to_string(),
            "payment $1000.00, periodic rate 0.0000%, remaining balance $6000.00, remaining interest $0.00, remaining term 6 months"
        );
    }

    proptest! {
        #[test]
        fn prop_total_interest_non_negative(
            principal in 0.0..1_000_000.0f64,
            rate in 0.0..0.35f64,
            months in 1u32..480,
        ) {
            prop_assert!(total_interest(principal, rate, months).unwrap() >= -1e-6);
        }

        #[test]
        fn prop_nothing_amortized_at_start(
            principal in 0.0..1_000_000.0f64,
            rate in 0.0..0.35f64,
            term in 1u32..480,
        ) {
            let balance = remaining_balance(principal, rate, 0, term).unwrap();
            prop_assert!((balance - principal).abs() <= principal * 1e-12 + 1e-9);
        }

        #[test]
        fn prop_zero_rate_decays_linearly(
            principal in 0.0..1_000_000.0f64,
            term in 1u32..480,
            elapsed in 0u32..480,
        ) {
            let balance = remaining_balance(principal, 0., elapsed, term).unwrap();
            let expected = if elapsed >= term {
                0.
            } else {
                principal * (1. - elapsed as f64 / term as f64)
            };
            prop_assert_eq!(balance, expected);
            prop_assert_eq!(remaining_balance(principal, 0., term, term).unwrap(), 0.);
        }
    }
}

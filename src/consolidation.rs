use log::{debug, info, warn};
use std::fmt;

use crate::error::{check_non_negative, ConsolidationError, Result};
use crate::loan::{monthly_payment, total_interest};
use crate::portfolio::{PortfolioSummary, ScenarioTotals};
use crate::round;

/// A refinanced loan replacing the mortgage and a chosen subset of debts.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsolidationPlan {
    pub new_rate: f64,
    pub new_term_months: u32,
    /// One-time costs, added to the new principal.
    pub fees: f64,
    /// Debts folded in alongside the mortgage. May be empty.
    pub selected_debt_names: Vec<String>,
}

impl ConsolidationPlan {
    pub fn new(new_rate: f64, new_term_months: u32, fees: f64) -> Self {
        Self {
            new_rate,
            new_term_months,
            fees,
            selected_debt_names: Vec::new(),
        }
    }

    pub fn select(mut self, name: impl Into<String>) -> Self {
        self.selected_debt_names.push(name.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("new rate", self.new_rate)?;
        check_non_negative("fees", self.fees)?;
        if self.new_term_months == 0 {
            return Err(ConsolidationError::InvalidTerm { months: 0 });
        }
        Ok(())
    }

    /// Principal of the new loan: the mortgage's remaining balance, the
    /// remaining balances of the selected debts, and the fees.
    pub fn new_balance(&self, current: &PortfolioSummary) -> Result<f64> {
        let mut balance = current.mortgage.remaining_balance + self.fees;
        for (i, name) in self.selected_debt_names.iter().enumerate() {
            // selecting a debt twice still folds it in once
            if self.selected_debt_names[..i].contains(name) {
                continue;
            }
            let debt = current
                .debt(name)
                .ok_or_else(|| ConsolidationError::UnknownDebt { name: name.clone() })?;
            balance += debt.remaining_balance();
        }
        Ok(balance)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsolidatedLoan {
    pub new_balance: f64,
    pub monthly_payment: f64,
    pub periodic_rate: f64,
    pub total_interest: f64,
    pub term_months: u32,
    pub annual_rate: f64,
}

impl ConsolidatedLoan {
    pub fn totals(&self) -> ScenarioTotals {
        ScenarioTotals {
            total_interest: self.total_interest,
            monthly_payment: self.monthly_payment,
            payoff_horizon_months: self.term_months,
            weighted_average_rate: round(self.annual_rate * 100., 2),
        }
    }
}

/// Prices the plan's new loan against the current portfolio.
pub fn project(plan: &ConsolidationPlan, current: &PortfolioSummary) -> Result<ConsolidatedLoan> {
    plan.validate()?;

    let new_balance = plan.new_balance(current)?;
    let pmt = monthly_payment(new_balance, plan.new_rate, plan.new_term_months)?;
    let interest = total_interest(new_balance, plan.new_rate, plan.new_term_months)?;

    let loan = ConsolidatedLoan {
        new_balance,
        monthly_payment: pmt.amount,
        periodic_rate: pmt.periodic_rate,
        total_interest: interest,
        term_months: plan.new_term_months,
        annual_rate: plan.new_rate,
    };
    debug!(
        "consolidated ${:.2} over {} months: payment ${:.2}, interest ${:.2}",
        loan.new_balance, loan.term_months, loan.monthly_payment, loan.total_interest
    );
    Ok(loan)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Consolidated interest is strictly lower.
    Saves,
    DoesNotSave,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Saves => write!(f, "Consolidating saves you money!"),
            Outcome::DoesNotSave => write!(f, "Consolidating may cost more in interest over time."),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    TotalInterest,
    MonthlyPayment,
    PayoffHorizonMonths,
    WeightedAverageRate,
    NetSavings,
    /// Current minus consolidated monthly payment.
    MonthlyPaymentChange,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Metric::TotalInterest => "Total interest",
            Metric::MonthlyPayment => "Monthly payment",
            Metric::PayoffHorizonMonths => "Payoff horizon (months)",
            Metric::WeightedAverageRate => "Interest rate (%)",
            Metric::NetSavings => "Net interest savings",
            Metric::MonthlyPaymentChange => "Monthly payment reduction",
        };
        write!(f, "{}", label)
    }
}

/// One line of the side-by-side table. The net-savings and payment-change
/// rows carry their difference in `consolidated` and leave `current` empty.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonRow {
    pub metric: Metric,
    pub current: Option<f64>,
    pub consolidated: f64,
}

/// Current portfolio against the consolidated plan.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioComparison {
    pub current: ScenarioTotals,
    pub consolidated: ScenarioTotals,
    /// Current minus consolidated total interest; negative when the plan
    /// costs more.
    pub net_savings: f64,
    pub outcome: Outcome,
}

impl ScenarioComparison {
    pub fn new(current: ScenarioTotals, consolidated: ScenarioTotals) -> Self {
        let net_savings = current.total_interest - consolidated.total_interest;
        let outcome = if consolidated.total_interest < current.total_interest {
            Outcome::Saves
        } else {
            Outcome::DoesNotSave
        };

        match outcome {
            Outcome::Saves => info!("consolidation saves ${:.2} in interest", net_savings),
            Outcome::DoesNotSave => warn!(
                "consolidation adds ${:.2} in interest",
                -net_savings
            ),
        }

        Self {
            current,
            consolidated,
            net_savings,
            outcome,
        }
    }

    /// Positive when the consolidated payment is lower.
    pub fn monthly_payment_change(&self) -> f64 {
        self.current.monthly_payment - self.consolidated.monthly_payment
    }

    pub fn rows(&self) -> Vec<ComparisonRow> {
        let row = |metric, current: f64, consolidated: f64| ComparisonRow {
            metric,
            current: Some(current),
            consolidated,
        };
        vec![
            row(
                Metric::TotalInterest,
                self.current.total_interest,
                self.consolidated.total_interest,
            ),
            row(
                Metric::MonthlyPayment,
                self.current.monthly_payment,
                self.consolidated.monthly_payment,
            ),
            row(
                Metric::PayoffHorizonMonths,
                self.current.payoff_horizon_months as f64,
                self.consolidated.payoff_horizon_months as f64,
            ),
            row(
                Metric::WeightedAverageRate,
                self.current.weighted_average_rate,
                self.consolidated.weighted_average_rate,
            ),
            ComparisonRow {
                metric: Metric::NetSavings,
                current: None,
                consolidated: self.net_savings,
            },
            ComparisonRow {
                metric: Metric::MonthlyPaymentChange,
                current: None,
                consolidated: self.monthly_payment_change(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::loan::FixedLoan;
    use crate::portfolio::{Debt, Mortgage, Portfolio};
    use crate::revolving::RevolvingDebt;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn current() -> PortfolioSummary {
        Portfolio::new(
            vec![
                Debt::fixed("Car", FixedLoan::new(25000., 0.07, 60, date(2024, 1, 15))),
                Debt::revolving("Visa", RevolvingDebt::new(5000., 0.20)),
            ],
            Mortgage::new(400000., 0.05, 300, date(2024, 1, 1)),
        )
        .unwrap()
        .evaluate(date(2026, 10, 17), &EngineConfig::default())
        .unwrap()
    }

    fn totals(total_interest: f64, monthly_payment: f64) -> ScenarioTotals {
        ScenarioTotals {
            total_interest,
            monthly_payment,
            payoff_horizon_months: 240,
            weighted_average_rate: 5.,
        }
    }

    #[test]
    fn test_new_balance() {
        let current = current();
        let mortgage = current.mortgage.remaining_balance;

        let plan = ConsolidationPlan::new(0.045, 300, 2500.);
        assert_abs_diff_eq!(plan.new_balance(&current).unwrap(), mortgage + 2500., epsilon = 1e-9);

        let plan = plan.select("Car").select("Visa");
        assert_abs_diff_eq!(
            plan.new_balance(&current).unwrap(),
            mortgage + 2500. + 12317.785 + 5000.,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_selecting_twice_counts_once() {
        let current = current();
        let once = ConsolidationPlan::new(0.045, 300, 0.).select("Visa");
        let twice = once.clone().select("Visa");
        assert_eq!(
            once.new_balance(&current).unwrap(),
            twice.new_balance(&current).unwrap()
        );
    }

    #[test]
    fn test_unknown_debt() {
        let plan = ConsolidationPlan::new(0.045, 300, 0.).select("Amex");
        assert_eq!(
            project(&plan, &current()),
            Err(ConsolidationError::UnknownDebt {
                name: "Amex".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_plan() {
        let current = current();
        assert_eq!(
            project(&ConsolidationPlan::new(0.045, 0, 0.), &current),
            Err(ConsolidationError::InvalidTerm { months: 0 })
        );
        assert!(project(&ConsolidationPlan::new(0.045, 300, -10.), &current).is_err());
        assert!(project(&ConsolidationPlan::new(-0.01, 300, 0.), &current).is_err());
    }

    #[test]
    fn test_project() {
        let current = current();
        let plan = ConsolidationPlan::new(0.045, 300, 2500.).select("Visa");
        let loan = project(&plan, &current).unwrap();

        let expected = monthly_payment(loan.new_balance, 0.045, 300).unwrap();
        assert_eq!(loan.monthly_payment, expected.amount);
        assert_eq!(loan.periodic_rate, expected.periodic_rate);
        assert_abs_diff_eq!(
            loan.total_interest,
            loan.monthly_payment * 300. - loan.new_balance,
            epsilon = 1e-6
        );
        assert_eq!(loan.totals().payoff_horizon_months, 300);
        assert_eq!(loan.totals().weighted_average_rate, 4.5);
    }

    #[test]
    fn test_savings_reported() {
        let comparison = ScenarioComparison::new(totals(50000., 3000.), totals(42000., 2800.));
        assert_eq!(comparison.net_savings, 8000.);
        assert_eq!(comparison.outcome, Outcome::Saves);
        assert_eq!(comparison.monthly_payment_change(), 200.);
        assert_eq!(comparison.outcome.to_string(), "Consolidating saves you money!");
    }

    #[test]
    fn test_no_savings_reported_neutrally() {
        let comparison = ScenarioComparison::new(totals(40000., 3000.), totals(46500., 2500.));
        assert_eq!(comparison.net_savings, -6500.);
        assert_eq!(comparison.outcome, Outcome::DoesNotSave);
        // lower payment does not make it a saving
        assert_eq!(comparison.monthly_payment_change(), 500.);

        let equal = ScenarioComparison::new(totals(40000., 3000.), totals(40000., 3000.));
        assert_eq!(equal.net_savings, 0.);
        assert_eq!(equal.outcome, Outcome::DoesNotSave);
        assert_eq!(
            equal.outcome.to_string(),
            "Consolidating may cost more in interest over time."
        );
    }

    #[test]
    fn test_rows() {
        let comparison = ScenarioComparison::new(totals(50000., 3000.), totals(42000., 2800.));
        let rows = comparison.rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(
            rows[0],
            ComparisonRow {
                metric: Metric::TotalInterest,
                current: Some(50000.),
                consolidated: 42000.
            }
        );
        assert_eq!(rows[2].current, Some(240.));
        assert_eq!(
            rows[4],
            ComparisonRow {
                metric: Metric::NetSavings,
                current: None,
                consolidated: 8000.
            }
        );
        assert_eq!(rows[4].metric.to_string(), "Net interest savings");
        assert_eq!(
            rows[5],
            ComparisonRow {
                metric: Metric::MonthlyPaymentChange,
                current: None,
                consolidated: 200.
            }
        );
    }
}

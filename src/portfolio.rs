use chrono::NaiveDate;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;

use crate::config::EngineConfig;
use crate::error::{ConsolidationError, Result};
use crate::loan::{FixedLoan, FixedLoanSummary};
use crate::rate::revolving_monthly_rate;
use crate::revolving::{RevolvingDebt, RevolvingSummary};
use crate::round;

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebtKind {
    Fixed(FixedLoan),
    Revolving(RevolvingDebt),
}

/// One named entry in a household's debt portfolio.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Debt {
    pub name: String,
    pub kind: DebtKind,
}

impl Debt {
    pub fn fixed(name: impl Into<String>, loan: FixedLoan) -> Self {
        Self {
            name: name.into(),
            kind: DebtKind::Fixed(loan),
        }
    }

    pub fn revolving(name: impl Into<String>, debt: RevolvingDebt) -> Self {
        Self {
            name: name.into(),
            kind: DebtKind::Revolving(debt),
        }
    }

    pub fn balance(&self) -> f64 {
        match &self.kind {
            DebtKind::Fixed(loan) => loan.principal,
            DebtKind::Revolving(debt) => debt.balance,
        }
    }

    pub fn annual_rate(&self) -> f64 {
        match &self.kind {
            DebtKind::Fixed(loan) => loan.annual_rate,
            DebtKind::Revolving(debt) => debt.annual_rate,
        }
    }

    pub fn evaluate(&self, as_of: NaiveDate, config: &EngineConfig) -> Result<DebtSummary> {
        let detail = match &self.kind {
            DebtKind::Fixed(loan) => DebtDetail::Fixed(loan.evaluate(as_of)?),
            DebtKind::Revolving(debt) => DebtDetail::Revolving(
                debt.evaluate(&config.revolving_policy, config.max_revolving_months)?,
            ),
        };
        Ok(DebtSummary {
            name: self.name.clone(),
            balance: self.balance(),
            annual_rate: self.annual_rate(),
            detail,
        })
    }
}

/// The household's primary mortgage. Always part of both the current and
/// the consolidated scenario.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mortgage {
    pub loan: FixedLoan,
}

impl Mortgage {
    pub fn new(balance: f64, annual_rate: f64, amortization_months: u32, start_date: NaiveDate) -> Self {
        Self {
            loan: FixedLoan::new(balance, annual_rate, amortization_months, start_date),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebtDetail {
    Fixed(FixedLoanSummary),
    Revolving(RevolvingSummary),
}

/// Derived figures for one debt.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebtSummary {
    pub name: String,
    pub balance: f64,
    pub annual_rate: f64,
    pub detail: DebtDetail,
}

impl DebtSummary {
    pub fn monthly_payment(&self) -> f64 {
        match &self.detail {
            DebtDetail::Fixed(s) => s.monthly_payment,
            DebtDetail::Revolving(s) => s.monthly_payment,
        }
    }

    /// Balance carried into a consolidation. A revolving debt is folded in
    /// at its full current balance.
    pub fn remaining_balance(&self) -> f64 {
        match &self.detail {
            DebtDetail::Fixed(s) => s.remaining_balance,
            DebtDetail::Revolving(_) => self.balance,
        }
    }

    /// Remaining interest for a fixed loan, total payoff interest for a
    /// revolving one.
    pub fn interest(&self) -> f64 {
        match &self.detail {
            DebtDetail::Fixed(s) => s.remaining_interest,
            DebtDetail::Revolving(s) => s.total_interest,
        }
    }

    /// Remaining term for a fixed loan, simulated payoff months for a
    /// revolving one.
    pub fn horizon_months(&self) -> u32 {
        match &self.detail {
            DebtDetail::Fixed(s) => s.remaining_term_months,
            DebtDetail::Revolving(s) => s.payoff_months,
        }
    }

    /// Rate at which the balance grows between payments.
    pub fn monthly_rate(&self) -> f64 {
        match &self.detail {
            DebtDetail::Fixed(s) => s.periodic_rate,
            DebtDetail::Revolving(_) => revolving_monthly_rate(self.annual_rate),
        }
    }
}

impl fmt::Display for DebtSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            DebtDetail::Fixed(s) => write!(f, "{}: {}", self.name, s),
            DebtDetail::Revolving(s) => write!(f, "{}: {}", self.name, s),
        }
    }
}

/// Balance-weighted mean of `(balance, rate)` pairs, as a percentage rounded
/// to two places. Zero when there is no balance at all.
pub fn weighted_average_rate<I>(positions: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (weighted, total) = positions
        .into_iter()
        .fold((0., 0.), |(weighted, total), (balance, rate)| {
            (weighted + balance * rate, total + balance)
        });
    if total == 0. {
        return 0.;
    }
    round(weighted / total * 100., 2)
}

/// Aggregate figures for one scenario.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioTotals {
    pub total_interest: f64,
    pub monthly_payment: f64,
    pub payoff_horizon_months: u32,
    /// Percent, e.g. 5.25.
    pub weighted_average_rate: f64,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    pub debts: Vec<Debt>,
    pub mortgage: Mortgage,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioSummary {
    pub debts: Vec<DebtSummary>,
    pub mortgage: FixedLoanSummary,
    pub totals: ScenarioTotals,
    /// Rate weighted by what is still owed rather than by the entered
    /// balances, in percent.
    pub outstanding_weighted_rate: f64,
}

impl PortfolioSummary {
    pub fn debt(&self, name: &str) -> Option<&DebtSummary> {
        self.debts.iter().find(|d| d.name == name)
    }
}

impl Portfolio {
    pub fn new(debts: Vec<Debt>, mortgage: Mortgage) -> Result<Self> {
        let portfolio = Self { debts, mortgage };
        portfolio.check_names()?;
        Ok(portfolio)
    }

    /// Names key debt selection, so they must be unique.
    pub fn check_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for debt in &self.debts {
            if !seen.insert(debt.name.as_str()) {
                return Err(ConsolidationError::DuplicateDebtName {
                    name: debt.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, as_of: NaiveDate, config: &EngineConfig) -> Result<PortfolioSummary> {
        self.check_names()?;

        let debts = self
            .debts
            .iter()
            .map(|debt| debt.evaluate(as_of, config))
            .collect::<Result<Vec<_>>>()?;
        let mortgage = self.mortgage.loan.evaluate(as_of)?;
        debug!("mortgage: {}", mortgage);

        let totals = ScenarioTotals {
            total_interest: debts.iter().map(DebtSummary::interest).sum::<f64>()
                + mortgage.remaining_interest,
            monthly_payment: debts.iter().map(DebtSummary::monthly_payment).sum::<f64>()
                + mortgage.monthly_payment,
            payoff_horizon_months: debts
                .iter()
                .map(DebtSummary::horizon_months)
                .fold(mortgage.remaining_term_months, u32::max),
            weighted_average_rate: weighted_average_rate(
                self.debts
                    .iter()
                    .map(|d| (d.balance(), d.annual_rate()))
                    .chain(std::iter::once((
                        self.mortgage.loan.principal,
                        self.mortgage.loan.annual_rate,
                    ))),
            ),
        };
        let outstanding_weighted_rate = weighted_average_rate(
            debts
                .iter()
                .map(|d| (d.remaining_balance(), d.annual_rate))
                .chain(std::iter::once((
                    mortgage.remaining_balance,
                    self.mortgage.loan.annual_rate,
                ))),
        );
        info!(
            "current scenario: {} debts, interest ${:.2}, payment ${:.2}, horizon {} months, rate {:.2}%",
            debts.len(),
            totals.total_interest,
            totals.monthly_payment,
            totals.payoff_horizon_months,
            totals.weighted_average_rate
        );

        Ok(PortfolioSummary {
            debts,
            mortgage,
            totals,
            outstanding_weighted_rate,
        })
    }
}

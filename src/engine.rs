use chrono::NaiveDate;
use log::info;

use crate::config::EngineConfig;
use crate::consolidation::{project, ConsolidatedLoan, ConsolidationPlan, ScenarioComparison};
use crate::error::Result;
use crate::portfolio::{Portfolio, PortfolioSummary};
use crate::timeline::TimelineSeries;

pub const MORTGAGE_SERIES: &str = "Mortgage";
pub const CONSOLIDATED_SERIES: &str = "Consolidated";

/// Everything the input layer collects for one evaluation.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationInput {
    pub portfolio: Portfolio,
    pub plan: ConsolidationPlan,
}

/// Everything the presentation layer renders for one evaluation.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    pub as_of: NaiveDate,
    pub current: PortfolioSummary,
    pub consolidated: ConsolidatedLoan,
    pub comparison: ScenarioComparison,
    pub timelines: Vec<TimelineSeries>,
}

impl Evaluation {
    /// `(series name, payoff months)` pairs for the timeline chart.
    pub fn payoff_chart(&self) -> Vec<(String, u32)> {
        self.timelines
            .iter()
            .map(|series| (series.name.clone(), series.payoff_months()))
            .collect()
    }
}

/// Stateless evaluator. Every call recomputes from the full input snapshot.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates the portfolio and the consolidation plan as of `as_of`.
    ///
    /// Fails with the first offending computation; never returns a partially
    /// populated result.
    pub fn evaluate(&self, input: &EvaluationInput, as_of: NaiveDate) -> Result<Evaluation> {
        let current = input.portfolio.evaluate(as_of, &self.config)?;
        let consolidated = project(&input.plan, &current)?;
        let comparison = ScenarioComparison::new(current.totals, consolidated.totals());
        let timelines = self.timelines(&current, &consolidated);

        info!(
            "evaluated {} debts as of {}: {}",
            current.debts.len(),
            as_of,
            comparison.outcome
        );
        Ok(Evaluation {
            as_of,
            current,
            consolidated,
            comparison,
            timelines,
        })
    }

    fn timelines(&self, current: &PortfolioSummary, consolidated: &ConsolidatedLoan) -> Vec<TimelineSeries> {
        let horizon = self.config.timeline_horizon_months;
        let mut series: Vec<TimelineSeries> = current
            .debts
            .iter()
            .map(|debt| {
                TimelineSeries::new(
                    debt.name.as_str(),
                    debt.remaining_balance(),
                    debt.monthly_rate(),
                    debt.monthly_payment(),
                    horizon,
                )
            })
            .collect();
        series.push(TimelineSeries::new(
            MORTGAGE_SERIES,
            current.mortgage.remaining_balance,
            current.mortgage.periodic_rate,
            current.mortgage.monthly_payment,
            horizon,
        ));
        series.push(TimelineSeries::new(
            CONSOLIDATED_SERIES,
            consolidated.new_balance,
            consolidated.periodic_rate,
            consolidated.monthly_payment,
            horizon,
        ));
        series
    }
}

/// Evaluates with the default configuration.
pub fn evaluate(input: &EvaluationInput, as_of: NaiveDate) -> Result<Evaluation> {
    Engine::default().evaluate(input, as_of)
}

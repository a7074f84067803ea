//! Amortization and debt-consolidation scenarios for a household portfolio.
//!
//! Fixed installment loans, revolving credit lines and a mortgage are
//! evaluated as of an injected date, aggregated into current-scenario totals,
//! and compared against a refinanced loan that folds the mortgage and a chosen
//! subset of debts into one.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use consolidate::{evaluate, ConsolidationPlan, Debt, EvaluationInput, FixedLoan, Mortgage, Portfolio, RevolvingDebt};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let portfolio = Portfolio::new(
//!     vec![
//!         Debt::fixed("Car", FixedLoan::new(25_000., 0.07, 60, start)),
//!         Debt::revolving("Visa", RevolvingDebt::new(5_000., 0.20)),
//!     ],
//!     Mortgage::new(400_000., 0.05, 300, start),
//! )
//! .unwrap();
//! let plan = ConsolidationPlan::new(0.045, 300, 2_500.).select("Visa");
//!
//! let as_of = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
//! let evaluation = evaluate(&EvaluationInput { portfolio, plan }, as_of).unwrap();
//! println!("{}", evaluation.comparison.outcome);
//! ```

pub mod config;
pub mod consolidation;
pub mod engine;
pub mod error;
pub mod loan;
pub mod portfolio;
pub mod rate;
pub mod revolving;
pub mod timeline;

pub use config::EngineConfig;
pub use consolidation::{ConsolidatedLoan, ConsolidationPlan, Outcome, ScenarioComparison};
pub use engine::{evaluate, Engine, Evaluation, EvaluationInput};
pub use error::{ConsolidationError, Result, Shortfall};
pub use loan::FixedLoan;
pub use portfolio::{Debt, DebtKind, Mortgage, Portfolio};
pub use rate::Compounding;
pub use revolving::{PaymentPolicy, RevolvingDebt};

pub(crate) fn round(amt: f64, dec_places: i32) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powi(dec_places)).round() / 10_f64.powi(dec_places)
    }
}

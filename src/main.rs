use chrono::{Local, NaiveDate};
use consolidate::engine::Evaluation;
use consolidate::portfolio::DebtDetail;
use consolidate::{
    evaluate, ConsolidationPlan, Debt, EvaluationInput, FixedLoan, Mortgage, Portfolio, RevolvingDebt,
};
use log::error;
use simple_logger::SimpleLogger;
use std::process;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    // evaluation date: first argument as YYYY-MM-DD, otherwise today
    let as_of = match std::env::args().nth(1) {
        Some(arg) => match NaiveDate::parse_from_str(&arg, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                error!("invalid evaluation date {:?}: {}", arg, e);
                process::exit(2);
            }
        },
        None => Local::now().date_naive(),
    };

    let input = match sample_input() {
        Ok(input) => input,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    match evaluate(&input, as_of) {
        Ok(evaluation) => show(&evaluation),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn sample_input() -> consolidate::Result<EvaluationInput> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    let portfolio = Portfolio::new(
        vec![
            Debt::fixed("Car loan", FixedLoan::new(25000., 0.07, 60, date(2024, 1, 15))),
            Debt::fixed("Furniture", FixedLoan::new(4800., 0., 24, date(2025, 6, 1))),
            Debt::revolving("Visa", RevolvingDebt::new(5000., 0.1999)),
            Debt::revolving("Line of credit", RevolvingDebt::new(12000., 0.095).with_payment(400.)),
        ],
        Mortgage::new(400000., 0.0514, 300, date(2022, 5, 1)),
    )?;
    let plan = ConsolidationPlan::new(0.0479, 300, 2500.)
        .select("Car loan")
        .select("Visa")
        .select("Line of credit");
    Ok(EvaluationInput { portfolio, plan })
}

fn show(evaluation: &Evaluation) {
    println!("Debt details as of {}", evaluation.as_of);
    for debt in &evaluation.current.debts {
        println!("  {}", debt);
        if let DebtDetail::Revolving(s) = &debt.detail {
            println!("    minimum payment ${:.2}", s.minimum_payment);
        }
    }
    println!("  Mortgage: {}", evaluation.current.mortgage);

    let loan = &evaluation.consolidated;
    println!(
        "Consolidated loan: ${:.2} over {} months, payment ${:.2}, interest ${:.2}",
        loan.new_balance, loan.term_months, loan.monthly_payment, loan.total_interest
    );

    println!("{:<26}{:>16}{:>16}", "", "Current", "Consolidated");
    for row in evaluation.comparison.rows() {
        match row.current {
            Some(current) => println!(
                "{:<26}{:>16.2}{:>16.2}",
                row.metric.to_string(),
                current,
                row.consolidated
            ),
            None => println!("{:<26}{:>16}{:>16.2}", row.metric.to_string(), "", row.consolidated),
        }
    }
    println!("{}", evaluation.comparison.outcome);

    println!("Payoff timeline");
    for (name, months) in evaluation.payoff_chart() {
        println!("  {:<20}{:>4} months", name, months);
    }
}

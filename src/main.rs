//! Retirement Planner CLI
//!
//! Runs the calculators against client JSON files and prints JSON results

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use retirement_planner::inputs::{convert_client_to_inputs, load_client, FinancialInputs};
use retirement_planner::loans::{
    amortization_schedule, calculate_loan_payment, calculate_max_borrowing_capacity_for,
    summarize_by_year, AmortizationYear, RepaymentFrequency,
};
use retirement_planner::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use retirement_planner::property::{
    calculate_property_serviceability, RetirementMetrics, ServiceabilityParams,
};
use retirement_planner::rounding::round_to_cents;
use retirement_planner::strategies::{generate_optimization_strategies, StrategyContext};
use retirement_planner::tax::{calculate_tax_for_inputs, calculate_total_tax};
use retirement_planner::{GrowthAssumptions, Planner};

#[derive(Parser, Debug)]
#[command(name = "retirement_planner", version, about = "Australian retirement and tax planning calculators")]
struct Cli {
    /// Directory containing growth_assumptions.csv (built-in defaults when omitted)
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Income tax and Medicare levy for a taxable income, or a client's full position
    Tax {
        #[arg(long, conflicts_with = "client", required_unless_present = "client")]
        income: Option<f64>,
        #[arg(long)]
        client: Option<PathBuf>,
    },
    /// Repayment, borrowing capacity and yearly amortization for a loan
    Loan {
        #[arg(long)]
        principal: f64,
        /// Annual interest rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 30.0)]
        years: f64,
        #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
        frequency: CliFrequency,
        /// Include the year-by-year schedule
        #[arg(long)]
        schedule: bool,
    },
    /// Year-by-year retirement projection
    Project {
        client: PathBuf,
        /// Continue the projection into retirement up to this age
        #[arg(long)]
        horizon: Option<u32>,
    },
    /// Largest investment property the retirement surplus supports
    Serviceability {
        client: PathBuf,
        /// Interest rate as a fraction (0.06 = 6%)
        #[arg(long, default_value_t = 0.06)]
        interest_rate: f64,
        #[arg(long, default_value_t = 0.8)]
        max_lvr: f64,
    },
    /// Ranked tax optimisation strategies
    Strategies { client: PathBuf },
    /// Every calculator for one client
    Summary {
        client: PathBuf,
        /// Previously saved projection to report instead of recomputing
        #[arg(long)]
        stored: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequency {
    Weekly,
    Fortnightly,
    Monthly,
}

impl From<CliFrequency> for RepaymentFrequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Weekly => RepaymentFrequency::Weekly,
            CliFrequency::Fortnightly => RepaymentFrequency::Fortnightly,
            CliFrequency::Monthly => RepaymentFrequency::Monthly,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoanReport {
    payment: f64,
    periods_per_year: u32,
    total_repaid: f64,
    total_interest: f64,
    borrowing_capacity_check: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<AmortizationYear>>,
}

fn load_assumptions(path: Option<&Path>) -> Result<GrowthAssumptions> {
    match path {
        Some(dir) => GrowthAssumptions::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display())),
        None => Ok(GrowthAssumptions::default()),
    }
}

fn load_inputs(client: &Path, assumptions: &GrowthAssumptions) -> Result<FinancialInputs> {
    let record = load_client(client)?;
    convert_client_to_inputs(&record, assumptions)
        .with_context(|| format!("validating {}", client.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let assumptions = load_assumptions(cli.assumptions.as_deref())?;

    match cli.command {
        Command::Tax { income, client } => match (income, client) {
            (_, Some(path)) => {
                let inputs = load_inputs(&path, &assumptions)?;
                print_json(&calculate_tax_for_inputs(&inputs)?)
            }
            (Some(income), None) => print_json(&calculate_total_tax(income)?),
            (None, None) => anyhow::bail!("either --income or --client is required"),
        },

        Command::Loan { principal, rate, years, frequency, schedule } => {
            let frequency = RepaymentFrequency::from(frequency);
            let payment = calculate_loan_payment(principal, rate, years, frequency)?;
            let rows = amortization_schedule(principal, rate, years, frequency)?;
            let total_repaid: f64 = rows.iter().map(|p| p.payment).sum();
            let total_interest: f64 = rows.iter().map(|p| p.interest).sum();

            print_json(&LoanReport {
                payment: round_to_cents(payment),
                periods_per_year: frequency.periods_per_year(),
                total_repaid: round_to_cents(total_repaid),
                total_interest: round_to_cents(total_interest),
                borrowing_capacity_check: round_to_cents(
                    calculate_max_borrowing_capacity_for(payment, rate, years, frequency)?,
                ),
                schedule: schedule.then(|| summarize_by_year(&rows, frequency)),
            })
        }

        Command::Project { client, horizon } => {
            let inputs = load_inputs(&client, &assumptions)?;
            let engine = ProjectionEngine::new(ProjectionConfig {
                horizon_age: horizon,
                ..Default::default()
            });
            print_json(&engine.project(&inputs)?)
        }

        Command::Serviceability { client, interest_rate, max_lvr } => {
            let inputs = load_inputs(&client, &assumptions)?;
            let projection = ProjectionEngine::default().project(&inputs)?;
            let metrics = RetirementMetrics::from_projection(&projection, inputs.annual_income);
            let params = ServiceabilityParams {
                interest_rate,
                max_lvr,
                ..Default::default()
            };
            print_json(&calculate_property_serviceability(&metrics, &params)?)
        }

        Command::Strategies { client } => {
            let inputs = load_inputs(&client, &assumptions)?;
            let tax = calculate_tax_for_inputs(&inputs)?;
            print_json(&generate_optimization_strategies(&StrategyContext::from_inputs(&inputs), &tax))
        }

        Command::Summary { client, stored } => {
            let record = load_client(&client)?;
            let stored: Option<ProjectionResult> = match stored {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    Some(serde_json::from_str(&json)
                        .with_context(|| format!("parsing projection {}", path.display()))?)
                }
                None => None,
            };
            let planner = Planner::with_assumptions(assumptions);
            print_json(&planner.summarize(&record, stored.as_ref())?)
        }
    }
}

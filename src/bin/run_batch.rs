//! Summarise every client in a file or directory of client JSON
//!
//! Outputs one CSV row per client with retirement, serviceability and tax figures

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use retirement_planner::inputs::{load_clients, load_clients_from_dir};
use retirement_planner::projection::ProjectionConfig;
use retirement_planner::{Planner, SummaryView};

#[derive(Parser, Debug)]
#[command(about = "Run client summaries in parallel and write a CSV report")]
struct Args {
    /// Client JSON file (one record or an array) or a directory of them
    input: PathBuf,

    /// Directory containing growth_assumptions.csv
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Continue projections into retirement up to this age
    #[arg(long)]
    horizon: Option<u32>,

    #[arg(long, default_value = "batch_summary.csv")]
    output: PathBuf,
}

/// One row of the batch report
#[derive(Debug, Serialize)]
struct SummaryRow {
    client: String,
    status: String,
    current_net_worth: f64,
    taxable_income: f64,
    total_tax: f64,
    networth_at_retirement: f64,
    passive_income: f64,
    monthly_surplus_deficit: f64,
    years_to_retirement: u32,
    max_property_value: f64,
    strategies: usize,
    total_potential_saving: f64,
    error: String,
}

impl SummaryRow {
    fn from_summary(summary: &SummaryView) -> Self {
        Self {
            client: summary.client_name.clone(),
            status: format!("{:?}", summary.projection.status),
            current_net_worth: summary.current_net_worth,
            taxable_income: summary.tax.taxable_income,
            total_tax: summary.tax.total_tax,
            networth_at_retirement: summary.projection.combined_networth_at_retirement,
            passive_income: summary.projection.projected_annual_passive_income,
            monthly_surplus_deficit: summary.projection.monthly_surplus_deficit,
            years_to_retirement: summary.projection.years_to_retirement,
            max_property_value: summary.serviceability.max_property_value,
            strategies: summary.strategies.len(),
            total_potential_saving: summary.total_potential_saving,
            error: String::new(),
        }
    }

    fn failed(client: &str, error: String) -> Self {
        Self {
            client: client.to_string(),
            status: "Error".to_string(),
            current_net_worth: 0.0,
            taxable_income: 0.0,
            total_tax: 0.0,
            networth_at_retirement: 0.0,
            passive_income: 0.0,
            monthly_surplus_deficit: 0.0,
            years_to_retirement: 0,
            max_property_value: 0.0,
            strategies: 0,
            total_potential_saving: 0.0,
            error,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let clients = if args.input.is_dir() {
        load_clients_from_dir(&args.input)?
    } else {
        load_clients(&args.input)?
    };
    println!("Loaded {} clients in {:?}", clients.len(), start.elapsed());

    let planner = match &args.assumptions {
        Some(dir) => Planner::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => Planner::new(),
    }
    .with_projection_config(ProjectionConfig {
        horizon_age: args.horizon,
        ..Default::default()
    });

    let run_start = Instant::now();
    let rows: Vec<SummaryRow> = clients
        .par_iter()
        .map(|client| match planner.summarize(client, None) {
            Ok(summary) => SummaryRow::from_summary(&summary),
            Err(e) => {
                warn!("{}: {}", client.display_name(), e);
                SummaryRow::failed(client.display_name(), e.to_string())
            }
        })
        .collect();
    println!("Summaries complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let failed = rows.iter().filter(|r| !r.error.is_empty()).count();
    let deficits = rows.iter().filter(|r| r.status == "Deficit").count();
    println!("\n=== Batch Summary ===");
    println!("Clients:   {}", rows.len());
    println!("Deficit:   {}", deficits);
    println!("Failed:    {}", failed);
    println!("Results written to: {}", args.output.display());

    Ok(())
}

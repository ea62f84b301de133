// src/bin/simulate.rs
use anyhow::Result;
use chrono::Utc;
use dotenv::dotenv;
use log::{error, info};
use std::io::{self, Write};
use std::process::ExitCode;

use dca_simulator::config::AppConfig;
use dca_simulator::models::{DateRange, SimulationRequest};
use dca_simulator::services::input::{parse_amount, parse_symbols, parse_years};
use dca_simulator::services::report;

fn prompt(label: &str) -> Result<String> {
    print!("{} ", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let aggregator = config.aggregator()?;

    let amount = prompt("Monthly investment amount:")?;
    let years = prompt("Number of years:")?;

    // Numbers are checked before asking for symbols, nothing is fetched on bad input
    let (total_periodic_amount, years) = match (parse_amount(&amount), parse_years(&years)) {
        (Ok(amount), Ok(years)) => (amount, years),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let symbols = parse_symbols(&prompt("Enter stock symbols separated by commas:")?);
    if symbols.is_empty() {
        info!("No symbols entered, nothing to simulate");
        return Ok(ExitCode::SUCCESS);
    }

    let request = SimulationRequest {
        symbols,
        total_periodic_amount,
        range: DateRange::trailing_years(years, Utc::now())?,
    };

    match aggregator.run_request(&request).await {
        Ok(result) => {
            let chart = report::chart(&result);
            println!();
            println!("{}", chart.title);
            for series in &chart.series {
                println!("  {}", series.label);
            }
            println!();
            print!("{}", report::table(&result));
            println!();
            println!("{}", report::summary_text(&result));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Simulation failed: {}", e);
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

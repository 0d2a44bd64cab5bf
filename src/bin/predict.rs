use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use goal_rush::config::{DataSources, ModelConfig};
use goal_rush::logging;
use goal_rush::pipeline::evaluate_slate;
use goal_rush::state::report_lines;

/// Prints the day's slate with over/BTTS/scoreline probabilities and value flags.
#[derive(Debug, Parser)]
#[command(name = "predict")]
struct Args {
    /// Team rate table (JSON). Defaults to GOAL_RUSH_TEAMS, then the demo table.
    #[arg(short, long)]
    teams: Option<PathBuf>,

    /// Fixture list (JSON). Defaults to GOAL_RUSH_FIXTURES, then the demo fixtures.
    #[arg(short, long)]
    fixtures: Option<PathBuf>,

    /// Decimal price for "over" on fixtures without their own quote.
    #[arg(short, long)]
    price: Option<f64>,

    /// Only print value bets.
    #[arg(long)]
    value_only: bool,

    /// Emit reports as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    logging::init_stderr();
    let args = Args::parse();
    debug!(?args, "predict args");

    let mut config = ModelConfig::load()?;
    if let Some(price) = args.price {
        config.over_price = price;
        config.validate().context("--price")?;
    }

    let mut sources = DataSources::from_env();
    if args.teams.is_some() {
        sources.teams = args.teams.clone();
    }
    if args.fixtures.is_some() {
        sources.fixtures = args.fixtures.clone();
    }
    let (repo, slate) = goal_rush::load_sources(&sources)?;

    let mut reports = evaluate_slate(&repo, &slate, &config);
    if args.value_only {
        reports.retain(|r| r.is_value());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("No matches today. Check back soon!");
        return Ok(());
    }
    for report in &reports {
        println!("{}", report.fixture.title());
        for (_, line) in report_lines(report, &config) {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}

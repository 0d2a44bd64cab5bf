use anyhow::Result;
use clap::Parser;

use goal_rush::config::ModelConfig;
use goal_rush::logging;
use goal_rush::outcome::{btts_truncated, evaluate_fixture};

/// Evaluates one pair of intensities against a price. No team data involved,
/// meant for quick manual checks of the outcome engine.
#[derive(Debug, Parser)]
#[command(name = "quote")]
struct Args {
    /// Expected home goals.
    lambda_home: f64,

    /// Expected away goals.
    lambda_away: f64,

    /// Decimal price for "over"; defaults to the configured price.
    #[arg(short, long)]
    price: Option<f64>,

    /// Total-goals line.
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Fixed scoreline grid bound instead of the tail-derived one.
    #[arg(long)]
    cutoff: Option<u32>,
}

fn main() -> Result<()> {
    logging::init_stderr();
    let args = Args::parse();

    let mut config = ModelConfig::load()?;
    if let Some(t) = args.threshold {
        config.outcome.threshold = t;
    }
    if args.cutoff.is_some() {
        config.outcome.score_cutoff = args.cutoff;
    }
    let price = args.price.unwrap_or(config.over_price);

    let r = evaluate_fixture(args.lambda_home, args.lambda_away, price, &config.outcome)?;
    let grid = config.outcome.grid_cutoff(args.lambda_home, args.lambda_away)?;

    println!("Total λ: {:.3}", r.total_lambda);
    println!("{}: {:.4}", config.market_label(), r.p_over);
    println!(
        "BTTS: {:.4} (grid 0..={grid}: {:.4})",
        r.p_btts,
        btts_truncated(args.lambda_home, args.lambda_away, grid)
    );
    for s in &r.top_scores {
        println!("  {s}: {:.4}", s.prob);
    }
    println!("Implied: {:.4}", r.implied);
    println!("EV @{:.2}: {:+.4}", price, r.ev);
    println!("Value: {}", if r.is_value { "yes" } else { "no" });
    Ok(())
}

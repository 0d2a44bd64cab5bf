//! Intensities + market price -> goal-market probabilities and an EV verdict.
//!
//! Home and away goals are independent Poissons, so total goals is
//! `Poisson(lambda_home + lambda_away)` and BTTS factorises into
//! `(1 - e^-lh) * (1 - e^-la)`. The joint grid is only used for scorelines.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::intensity::check_lambda;
use crate::poisson;

/// Tunables of the outcome engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeParams {
    /// Total-goals line for the "over" market.
    pub threshold: f64,
    /// Fixed scoreline grid bound; `None` derives it from the intensities.
    pub score_cutoff: Option<u32>,
    /// Scorelines at or below this probability are not reported.
    pub report_threshold: f64,
    /// Tail mass allowed outside a derived grid.
    pub tail_tolerance: f64,
    pub top_n: usize,
}

impl Default for OutcomeParams {
    fn default() -> Self {
        Self {
            threshold: 1.5,
            score_cutoff: None,
            report_threshold: 0.02,
            tail_tolerance: 1e-6,
            top_n: 3,
        }
    }
}

impl OutcomeParams {
    pub fn validate(&self) -> ModelResult<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ModelError::InvalidThreshold {
                name: "goal threshold",
                value: self.threshold,
            });
        }
        if !(0.0..1.0).contains(&self.report_threshold) {
            return Err(ModelError::InvalidThreshold {
                name: "report threshold",
                value: self.report_threshold,
            });
        }
        if !(self.tail_tolerance > 0.0 && self.tail_tolerance < 1.0) {
            return Err(ModelError::InvalidThreshold {
                name: "tail tolerance",
                value: self.tail_tolerance,
            });
        }
        if let Some(cutoff) = self.score_cutoff {
            if cutoff > poisson::MAX_GRID_GOALS {
                return Err(ModelError::InvalidThreshold {
                    name: "score cutoff",
                    value: cutoff as f64,
                });
            }
        }
        Ok(())
    }

    /// Largest goal count per side covered by the scoreline grid.
    pub fn grid_cutoff(&self, lambda_home: f64, lambda_away: f64) -> ModelResult<u32> {
        if let Some(cutoff) = self.score_cutoff {
            return Ok(cutoff);
        }
        let lambda = lambda_home.max(lambda_away);
        let too_large = ModelError::ScoreGridTooLarge {
            lambda,
            limit: poisson::MAX_GRID_GOALS,
        };
        if lambda > poisson::MAX_GRID_GOALS as f64 {
            return Err(too_large);
        }
        let cutoff = poisson::tail_cutoff(lambda, self.tail_tolerance);
        if cutoff > poisson::MAX_GRID_GOALS {
            return Err(too_large);
        }
        Ok(cutoff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u32,
    pub away: u32,
    pub prob: f64,
}

impl Scoreline {
    pub fn total_goals(&self) -> u32 {
        self.home + self.away
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub total_lambda: f64,
    pub threshold: f64,
    pub p_over: f64,
    pub p_btts: f64,
    pub top_scores: Vec<Scoreline>,
    pub price: f64,
    pub implied: f64,
    pub ev: f64,
    pub is_value: bool,
}

pub fn evaluate_fixture(
    lambda_home: f64,
    lambda_away: f64,
    price: f64,
    params: &OutcomeParams,
) -> ModelResult<PredictionResult> {
    let lambda_home = check_lambda("home", lambda_home)?;
    let lambda_away = check_lambda("away", lambda_away)?;
    let implied = implied_probability(price)?;
    params.validate()?;

    let total_lambda = lambda_home + lambda_away;
    let p_over = poisson::prob_exceeds(params.threshold, total_lambda);
    let p_btts = btts_probability(lambda_home, lambda_away);

    let cutoff = params.grid_cutoff(lambda_home, lambda_away)?;
    let top_scores = ranked_scorelines(lambda_home, lambda_away, cutoff, params.report_threshold)
        .into_iter()
        .take(params.top_n)
        .collect();

    let ev = expected_value(p_over, price);

    Ok(PredictionResult {
        total_lambda,
        threshold: params.threshold,
        p_over,
        p_btts,
        top_scores,
        price,
        implied,
        ev,
        is_value: ev > 0.0,
    })
}

pub fn implied_probability(price: f64) -> ModelResult<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ModelError::InvalidPrice(price));
    }
    Ok(1.0 / price)
}

/// Profit per unit stake at `price` if `prob` is the true probability.
pub fn expected_value(prob: f64, price: f64) -> f64 {
    prob * price - 1.0
}

/// Closed form `P(home >= 1) * P(away >= 1)`.
pub fn btts_probability(lambda_home: f64, lambda_away: f64) -> f64 {
    (1.0 - (-lambda_home).exp()) * (1.0 - (-lambda_away).exp())
}

/// BTTS summed over the `0..=cutoff` grid. Converges to the closed form from
/// below as `cutoff` grows; kept for cross-checking.
pub fn btts_truncated(lambda_home: f64, lambda_away: f64, cutoff: u32) -> f64 {
    let pmf_h = poisson::pmf_table(lambda_home, cutoff);
    let pmf_a = poisson::pmf_table(lambda_away, cutoff);
    let scoring_h: f64 = pmf_h.iter().skip(1).sum();
    let scoring_a: f64 = pmf_a.iter().skip(1).sum();
    scoring_h * scoring_a
}

/// Every grid scoreline above `report_threshold`, most likely first. Exact ties
/// go to fewer total goals, then fewer home goals.
pub fn ranked_scorelines(
    lambda_home: f64,
    lambda_away: f64,
    cutoff: u32,
    report_threshold: f64,
) -> Vec<Scoreline> {
    let pmf_h = poisson::pmf_table(lambda_home, cutoff);
    let pmf_a = poisson::pmf_table(lambda_away, cutoff);

    let mut out = Vec::new();
    for (i, p_i) in pmf_h.iter().enumerate() {
        for (j, p_j) in pmf_a.iter().enumerate() {
            let prob = p_i * p_j;
            if prob > report_threshold {
                out.push(Scoreline {
                    home: i as u32,
                    away: j as u32,
                    prob,
                });
            }
        }
    }
    out.sort_by(compare_scorelines);
    out
}

fn compare_scorelines(a: &Scoreline, b: &Scoreline) -> Ordering {
    b.prob
        .total_cmp(&a.prob)
        .then(a.total_goals().cmp(&b.total_goals()))
        .then(a.home.cmp(&b.home))
}

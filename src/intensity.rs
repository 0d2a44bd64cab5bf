//! Team rates -> expected goals for each side.
//!
//! Each side's intensity blends an xG-based rate and a realized-goals rate:
//!
//! ```text
//! xg_rate    = (attack_xg / avg_xg)       * defence_xga * avg_xg
//! goals_rate = (attack_gf / avg_goals)    * defence_ga  * avg_goals
//! lambda     = w_xg * xg_rate + w_goals * goals_rate
//! ```
//!
//! The home side attacks with its home rates against the away side's away
//! defensive rates, and vice versa.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ModelError, ModelResult};
use crate::rates::{LeagueBaseline, RateField, TeamRateProfile};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// A weight left out of a config file keeps its default; the pair must still
/// sum to 1.0 once merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub xg: f64,
    pub goals: f64,
}

impl BlendWeights {
    pub fn new(xg: f64, goals: f64) -> ModelResult<Self> {
        let w = Self { xg, goals };
        w.validate()?;
        Ok(w)
    }

    pub fn validate(&self) -> ModelResult<()> {
        let finite = self.xg.is_finite() && self.goals.is_finite();
        let non_negative = self.xg >= 0.0 && self.goals >= 0.0;
        if finite && non_negative && ((self.xg + self.goals) - 1.0).abs() <= WEIGHT_SUM_TOLERANCE {
            Ok(())
        } else {
            Err(ModelError::UnsupportedWeights {
                xg: self.xg,
                goals: self.goals,
            })
        }
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self { xg: 0.7, goals: 0.3 }
    }
}

/// What to do when a defence has no realized goals-against figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalsAgainstProxy {
    /// Fail with `MissingRateData`.
    #[default]
    Strict,
    /// Use the same context's xG-against instead, logging every substitution.
    /// This changes the meaning of the goals term, so it is opt-in only.
    ExpectedGoalsAgainst,
}

impl GoalsAgainstProxy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" | "none" | "off" => Some(Self::Strict),
            "xga" | "expected_goals_against" => Some(Self::ExpectedGoalsAgainst),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intensities {
    pub home: f64,
    pub away: f64,
}

impl Intensities {
    pub fn total(&self) -> f64 {
        self.home + self.away
    }
}

struct SideFields {
    xg: RateField,
    goals_for: RateField,
    xg_against: RateField,
    goals_against: RateField,
}

const HOME_SIDE: SideFields = SideFields {
    xg: RateField::HomeXg,
    goals_for: RateField::HomeGoalsFor,
    xg_against: RateField::HomeXgAgainst,
    goals_against: RateField::HomeGoalsAgainst,
};

const AWAY_SIDE: SideFields = SideFields {
    xg: RateField::AwayXg,
    goals_for: RateField::AwayGoalsFor,
    xg_against: RateField::AwayXgAgainst,
    goals_against: RateField::AwayGoalsAgainst,
};

/// Strict estimate: every required field must be present.
pub fn estimate_intensities(
    home: &TeamRateProfile,
    away: &TeamRateProfile,
    baseline: &LeagueBaseline,
    weights: BlendWeights,
) -> ModelResult<Intensities> {
    estimate_intensities_with(home, away, baseline, weights, GoalsAgainstProxy::Strict)
}

pub fn estimate_intensities_with(
    home: &TeamRateProfile,
    away: &TeamRateProfile,
    baseline: &LeagueBaseline,
    weights: BlendWeights,
    proxy: GoalsAgainstProxy,
) -> ModelResult<Intensities> {
    weights.validate()?;
    baseline.validate()?;

    let lambda_home = side_intensity(home, &HOME_SIDE, away, &AWAY_SIDE, baseline, weights, proxy)?;
    let lambda_away = side_intensity(away, &AWAY_SIDE, home, &HOME_SIDE, baseline, weights, proxy)?;

    Ok(Intensities {
        home: check_lambda("home", lambda_home)?,
        away: check_lambda("away", lambda_away)?,
    })
}

fn side_intensity(
    attack: &TeamRateProfile,
    attack_fields: &SideFields,
    defence: &TeamRateProfile,
    defence_fields: &SideFields,
    baseline: &LeagueBaseline,
    weights: BlendWeights,
    proxy: GoalsAgainstProxy,
) -> ModelResult<f64> {
    let xg = attack.require(attack_fields.xg)?;
    let goals_for = attack.require(attack_fields.goals_for)?;
    let xg_against = defence.require(defence_fields.xg_against)?;
    let goals_against = goals_against(defence, defence_fields, proxy)?;

    let xg_rate = (xg / baseline.avg_xg) * xg_against * baseline.avg_xg;
    let goals_rate = (goals_for / baseline.avg_goals) * goals_against * baseline.avg_goals;
    Ok(weights.xg * xg_rate + weights.goals * goals_rate)
}

fn goals_against(
    defence: &TeamRateProfile,
    fields: &SideFields,
    proxy: GoalsAgainstProxy,
) -> ModelResult<f64> {
    match (defence.has(fields.goals_against), proxy) {
        (true, _) | (false, GoalsAgainstProxy::Strict) => defence.require(fields.goals_against),
        (false, GoalsAgainstProxy::ExpectedGoalsAgainst) => {
            let value = defence.require(fields.xg_against)?;
            warn!(
                team = %defence.team,
                missing = %fields.goals_against,
                substitute = %fields.xg_against,
                "goals-against proxied by xG-against"
            );
            Ok(value)
        }
    }
}

pub(crate) fn check_lambda(side: &'static str, value: f64) -> ModelResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ModelError::InvalidIntensity { side, value })
    }
}

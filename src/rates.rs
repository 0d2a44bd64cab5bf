use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// The eight per-match averages a team profile may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateField {
    HomeXg,
    HomeGoalsFor,
    HomeXgAgainst,
    HomeGoalsAgainst,
    AwayXg,
    AwayGoalsFor,
    AwayXgAgainst,
    AwayGoalsAgainst,
}

impl RateField {
    pub fn as_str(self) -> &'static str {
        match self {
            RateField::HomeXg => "home_xg",
            RateField::HomeGoalsFor => "home_goals_for",
            RateField::HomeXgAgainst => "home_xg_against",
            RateField::HomeGoalsAgainst => "home_goals_against",
            RateField::AwayXg => "away_xg",
            RateField::AwayGoalsFor => "away_goals_for",
            RateField::AwayXgAgainst => "away_xg_against",
            RateField::AwayGoalsAgainst => "away_goals_against",
        }
    }
}

impl fmt::Display for RateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-team scoring/conceding averages. A profile only carries the context
/// (home or away) the team is actually used in; absent fields stay `None` and
/// are reported, never defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRateProfile {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub home_xg: Option<f64>,
    #[serde(default, alias = "home_gf")]
    pub home_goals_for: Option<f64>,
    #[serde(default, alias = "home_xga")]
    pub home_xg_against: Option<f64>,
    #[serde(default, alias = "home_ga")]
    pub home_goals_against: Option<f64>,
    #[serde(default)]
    pub away_xg: Option<f64>,
    #[serde(default, alias = "away_gf")]
    pub away_goals_for: Option<f64>,
    #[serde(default, alias = "away_xga")]
    pub away_xg_against: Option<f64>,
    #[serde(default, alias = "away_ga")]
    pub away_goals_against: Option<f64>,
}

impl TeamRateProfile {
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter, handy for tables and tests.
    pub fn with(mut self, field: RateField, value: f64) -> Self {
        *self.slot_mut(field) = Some(value);
        self
    }

    pub fn get(&self, field: RateField) -> Option<f64> {
        match field {
            RateField::HomeXg => self.home_xg,
            RateField::HomeGoalsFor => self.home_goals_for,
            RateField::HomeXgAgainst => self.home_xg_against,
            RateField::HomeGoalsAgainst => self.home_goals_against,
            RateField::AwayXg => self.away_xg,
            RateField::AwayGoalsFor => self.away_goals_for,
            RateField::AwayXgAgainst => self.away_xg_against,
            RateField::AwayGoalsAgainst => self.away_goals_against,
        }
    }

    fn slot_mut(&mut self, field: RateField) -> &mut Option<f64> {
        match field {
            RateField::HomeXg => &mut self.home_xg,
            RateField::HomeGoalsFor => &mut self.home_goals_for,
            RateField::HomeXgAgainst => &mut self.home_xg_against,
            RateField::HomeGoalsAgainst => &mut self.home_goals_against,
            RateField::AwayXg => &mut self.away_xg,
            RateField::AwayGoalsFor => &mut self.away_goals_for,
            RateField::AwayXgAgainst => &mut self.away_xg_against,
            RateField::AwayGoalsAgainst => &mut self.away_goals_against,
        }
    }

    /// Field value or `MissingRateData`; rejects negative and non-finite values.
    pub fn require(&self, field: RateField) -> ModelResult<f64> {
        let value = self
            .get(field)
            .ok_or_else(|| ModelError::missing_field(&self.team, field))?;
        check_rate(&self.team, field, value)
    }

    pub fn has(&self, field: RateField) -> bool {
        self.get(field).is_some()
    }
}

pub(crate) fn check_rate(team: &str, field: RateField, value: f64) -> ModelResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::InvalidRate {
            team: team.to_string(),
            field,
            value,
        });
    }
    Ok(value)
}

/// League-wide goals per match, used to normalise attacking rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeagueBaseline {
    pub avg_xg: f64,
    #[serde(alias = "avg_gf")]
    pub avg_goals: f64,
}

impl LeagueBaseline {
    pub fn new(avg_xg: f64, avg_goals: f64) -> Self {
        Self { avg_xg, avg_goals }
    }

    pub fn validate(&self) -> ModelResult<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.avg_xg) && ok(self.avg_goals) {
            Ok(())
        } else {
            Err(ModelError::InvalidBaseline {
                avg_xg: self.avg_xg,
                avg_goals: self.avg_goals,
            })
        }
    }
}

impl Default for LeagueBaseline {
    fn default() -> Self {
        Self {
            avg_xg: 1.3,
            avg_goals: 1.15,
        }
    }
}

use thiserror::Error;

use crate::rates::RateField;

/// Errors raised by the prediction core. Nothing here is transient, so callers
/// never retry; they skip, defer or report the fixture.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("missing rate data for {team}: {}", describe_field(.field))]
    MissingRateData {
        team: String,
        /// `None` when the team has no profile at all.
        field: Option<RateField>,
    },

    #[error("invalid rate for {team}: {field} = {value}")]
    InvalidRate {
        team: String,
        field: RateField,
        value: f64,
    },

    #[error("invalid league baseline: avg_xg = {avg_xg}, avg_goals = {avg_goals}")]
    InvalidBaseline { avg_xg: f64, avg_goals: f64 },

    #[error("invalid price: {0} (must be a positive decimal price)")]
    InvalidPrice(f64),

    #[error("invalid {side} intensity: {value}")]
    InvalidIntensity { side: &'static str, value: f64 },

    #[error("invalid {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("scoreline grid for intensity {lambda} would pass {limit} goals per side")]
    ScoreGridTooLarge { lambda: f64, limit: u32 },

    #[error("unsupported blend weights: xg = {xg}, goals = {goals} (must be non-negative and sum to 1.0)")]
    UnsupportedWeights { xg: f64, goals: f64 },
}

fn describe_field(field: &Option<RateField>) -> String {
    match field {
        Some(f) => format!("field {f} absent"),
        None => "no profile".to_string(),
    }
}

impl ModelError {
    pub fn missing_team(team: impl Into<String>) -> Self {
        Self::MissingRateData {
            team: team.into(),
            field: None,
        }
    }

    pub fn missing_field(team: impl Into<String>, field: RateField) -> Self {
        Self::MissingRateData {
            team: team.into(),
            field: Some(field),
        }
    }

    /// True for the data-availability failures a presenter shows as "data unavailable".
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingRateData { .. })
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

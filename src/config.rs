use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelResult;
use crate::intensity::{BlendWeights, GoalsAgainstProxy};
use crate::outcome::{OutcomeParams, implied_probability};

pub const CONFIG_ENV: &str = "GOAL_RUSH_CONFIG";
pub const TEAMS_ENV: &str = "GOAL_RUSH_TEAMS";
pub const FIXTURES_ENV: &str = "GOAL_RUSH_FIXTURES";

/// Reads `.env.local` then `.env` into the process environment. Missing files
/// are fine; variables already set win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Every model constant in one place. Defaults reproduce the
/// "70% xG + 30% goals, over 1.5 @ 1.33" setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weights: BlendWeights,
    pub ga_proxy: GoalsAgainstProxy,
    pub outcome: OutcomeParams,
    /// Decimal price for "over" when a fixture carries no quote of its own.
    pub over_price: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights: BlendWeights::default(),
            ga_proxy: GoalsAgainstProxy::Strict,
            outcome: OutcomeParams::default(),
            over_price: 1.33,
        }
    }
}

impl ModelConfig {
    /// `.env.local`/`.env`, then the JSON file named by `GOAL_RUSH_CONFIG`,
    /// then individual `GOAL_RUSH_*` overrides.
    pub fn load() -> Result<Self> {
        load_dotenv();

        let mut cfg = match env::var(CONFIG_ENV) {
            Ok(path) => Self::load_json(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        cfg.apply_env(|key| env::var(key).ok());
        cfg.validate().context("model config")?;
        debug!(?cfg, "model config loaded");
        Ok(cfg)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read model config {}", path.display()))?;
        let cfg = serde_json::from_str::<Self>(&raw)
            .with_context(|| format!("parse model config {}", path.display()))?;
        debug!(path = %path.display(), "model config file read");
        Ok(cfg)
    }

    /// Applies overrides from `lookup`. Values that do not parse are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let num = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());

        if let Some(v) = num("GOAL_RUSH_XG_WEIGHT") {
            self.weights.xg = v;
        }
        if let Some(v) = num("GOAL_RUSH_GOALS_WEIGHT") {
            self.weights.goals = v;
        }
        if let Some(v) = num("GOAL_RUSH_THRESHOLD") {
            self.outcome.threshold = v;
        }
        if let Some(v) = num("GOAL_RUSH_REPORT_THRESHOLD") {
            self.outcome.report_threshold = v;
        }
        if let Some(v) = num("GOAL_RUSH_OVER_PRICE") {
            self.over_price = v;
        }
        if let Some(v) = lookup("GOAL_RUSH_SCORE_CUTOFF").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.outcome.score_cutoff = Some(v);
        }
        if let Some(v) = lookup("GOAL_RUSH_GA_PROXY").and_then(|v| GoalsAgainstProxy::parse(&v)) {
            self.ga_proxy = v;
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        self.weights.validate()?;
        self.outcome.validate()?;
        implied_probability(self.over_price)?;
        Ok(())
    }

    /// "Over 1.5" style label for the configured line.
    pub fn market_label(&self) -> String {
        format!("Over {}", self.outcome.threshold)
    }
}

/// Optional data files; `None` means the built-in demo data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSources {
    pub teams: Option<PathBuf>,
    pub fixtures: Option<PathBuf>,
}

impl DataSources {
    pub fn from_env() -> Self {
        let path = |key: &str| {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            teams: path(TEAMS_ENV),
            fixtures: path(FIXTURES_ENV),
        }
    }
}

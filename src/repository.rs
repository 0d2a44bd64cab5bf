use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::rates::{LeagueBaseline, RateField, TeamRateProfile};

/// Source of team rates and league baselines. The pipeline only ever reads
/// through this trait, so a live statistics store or a test double can stand
/// in for the built-in table.
pub trait TeamStrengthRepository: Sync {
    fn get_profile(&self, team: &str) -> ModelResult<&TeamRateProfile>;

    fn get_baseline(&self, league: &str) -> LeagueBaseline;
}

/// Fully populated, read-only table. Built once per session before any
/// fixture is evaluated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryRepository {
    #[serde(default)]
    pub baseline: LeagueBaseline,
    /// Per-league overrides of `baseline`, keyed by competition label.
    #[serde(default)]
    pub league_baselines: HashMap<String, LeagueBaseline>,
    #[serde(default)]
    pub teams: HashMap<String, TeamRateProfile>,
}

impl InMemoryRepository {
    pub fn new(baseline: LeagueBaseline) -> Self {
        Self {
            baseline,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, profile: TeamRateProfile) {
        self.teams.insert(profile.team.clone(), profile);
    }

    pub fn with_league_baseline(mut self, league: impl Into<String>, baseline: LeagueBaseline) -> Self {
        self.league_baselines.insert(league.into(), baseline);
        self
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Six-team demo table with a single 1.3 xG / 1.15 goals baseline.
    pub fn demo() -> Self {
        use RateField::*;

        let mut repo = Self::new(LeagueBaseline::new(1.3, 1.15));
        let home = |team: &str, xg, gf, xga, ga| {
            TeamRateProfile::new(team)
                .with(HomeXg, xg)
                .with(HomeGoalsFor, gf)
                .with(HomeXgAgainst, xga)
                .with(HomeGoalsAgainst, ga)
        };
        let away = |team: &str, xg, gf, xga, ga| {
            TeamRateProfile::new(team)
                .with(AwayXg, xg)
                .with(AwayGoalsFor, gf)
                .with(AwayXgAgainst, xga)
                .with(AwayGoalsAgainst, ga)
        };

        repo.insert(home("Bradford City", 1.6, 1.8, 0.7, 0.8));
        repo.insert(away("Lincoln City", 0.7, 0.9, 0.8, 1.0));
        repo.insert(home("Genoa", 0.6, 0.0, 1.4, 1.0));
        repo.insert(away("Cremonese", 1.1, 1.0, 1.0, 1.0));
        repo.insert(home("Leeds United", 1.1, 1.0, 1.2, 1.3));
        repo.insert(away("West Ham", 0.7, 0.75, 1.8, 2.25));
        repo
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut repo: Self = serde_json::from_str(raw).context("parse team rate table")?;
        // Map keys are authoritative for the team name.
        for (name, profile) in repo.teams.iter_mut() {
            profile.team = name.clone();
        }
        repo.baseline
            .validate()
            .context("default league baseline")?;
        for (league, baseline) in &repo.league_baselines {
            baseline
                .validate()
                .with_context(|| format!("league baseline for {league}"))?;
        }
        Ok(repo)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read team rate table {}", path.display()))?;
        Self::from_json_str(&raw)
    }
}

impl TeamStrengthRepository for InMemoryRepository {
    fn get_profile(&self, team: &str) -> ModelResult<&TeamRateProfile> {
        self.teams
            .get(team)
            .ok_or_else(|| ModelError::missing_team(team))
    }

    fn get_baseline(&self, league: &str) -> LeagueBaseline {
        self.league_baselines
            .get(league)
            .copied()
            .unwrap_or(self.baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_table_has_six_teams() {
        let repo = InMemoryRepository::demo();
        assert_eq!(repo.len(), 6);
        let genoa = repo.get_profile("Genoa").unwrap();
        assert_eq!(genoa.home_goals_for, Some(0.0));
        assert!(genoa.away_xg.is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let repo = InMemoryRepository::demo();
        assert!(repo.get_profile("Genoa").is_ok());
        let err = repo.get_profile("genoa").unwrap_err();
        assert_eq!(err, ModelError::missing_team("genoa"));
    }

    #[test]
    fn league_baseline_overrides_default() {
        let repo = InMemoryRepository::demo()
            .with_league_baseline("Serie A", LeagueBaseline::new(1.25, 1.2));
        assert_eq!(repo.get_baseline("Serie A"), LeagueBaseline::new(1.25, 1.2));
        assert_eq!(repo.get_baseline("League One"), LeagueBaseline::new(1.3, 1.15));
    }

    #[test]
    fn json_table_uses_map_keys_as_names() {
        let raw = r#"{
            "baseline": {"avg_xg": 1.4, "avg_goals": 1.3},
            "league_baselines": {"Serie A": {"avg_xg": 1.2, "avg_gf": 1.1}},
            "teams": {
                "Genoa": {"home_xg": 0.6, "home_gf": 0.0, "home_xga": 1.4, "home_ga": 1.0}
            }
        }"#;
        let repo = InMemoryRepository::from_json_str(raw).unwrap();
        assert_eq!(repo.get_profile("Genoa").unwrap().team, "Genoa");
        assert_eq!(repo.get_baseline("Serie A").avg_goals, 1.1);
        assert_eq!(repo.get_baseline("Other").avg_xg, 1.4);
    }

    #[test]
    fn json_table_rejects_zero_baseline() {
        let raw = r#"{"baseline": {"avg_xg": 0.0, "avg_goals": 1.3}, "teams": {}}"#;
        assert!(InMemoryRepository::from_json_str(raw).is_err());
    }
}

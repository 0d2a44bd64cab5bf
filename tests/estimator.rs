use std::collections::HashMap;

use goal_rush::config::ModelConfig;
use goal_rush::fixtures::Fixture;
use goal_rush::intensity::{BlendWeights, GoalsAgainstProxy, estimate_intensities};
use goal_rush::pipeline::predict_fixture;
use goal_rush::rates::{LeagueBaseline, RateField, TeamRateProfile};
use goal_rush::{InMemoryRepository, ModelError, ModelResult, TeamStrengthRepository};

/// Test double standing in for a live statistics store.
struct FakeStore {
    teams: HashMap<String, TeamRateProfile>,
    baselines: HashMap<String, LeagueBaseline>,
}

impl TeamStrengthRepository for FakeStore {
    fn get_profile(&self, team: &str) -> ModelResult<&TeamRateProfile> {
        self.teams.get(team).ok_or_else(|| ModelError::missing_team(team))
    }

    fn get_baseline(&self, league: &str) -> LeagueBaseline {
        self.baselines
            .get(league)
            .copied()
            .unwrap_or_default()
    }
}

fn fake_store() -> FakeStore {
    use RateField::*;
    let home = TeamRateProfile::new("Home FC")
        .with(HomeXg, 2.0)
        .with(HomeGoalsFor, 2.2)
        .with(HomeXgAgainst, 1.0)
        .with(HomeGoalsAgainst, 0.9);
    let away = TeamRateProfile::new("Away FC")
        .with(AwayXg, 1.2)
        .with(AwayGoalsFor, 1.0)
        .with(AwayXgAgainst, 1.5)
        .with(AwayGoalsAgainst, 1.6);
    FakeStore {
        teams: HashMap::from([
            ("Home FC".to_string(), home),
            ("Away FC".to_string(), away),
        ]),
        baselines: HashMap::from([("Cup".to_string(), LeagueBaseline::new(1.4, 1.35))]),
    }
}

#[test]
fn demo_fixture_intensities() {
    let repo = InMemoryRepository::demo();
    let baseline = repo.get_baseline("Premier League");
    let lam = estimate_intensities(
        repo.get_profile("Leeds United").unwrap(),
        repo.get_profile("West Ham").unwrap(),
        &baseline,
        BlendWeights::default(),
    )
    .unwrap();
    // home: 0.7 * 1.1 * 1.8 + 0.3 * 1.0 * 2.25
    assert!((lam.home - 2.061).abs() < 1e-9);
    // away: 0.7 * 0.7 * 1.2 + 0.3 * 0.75 * 1.3
    assert!((lam.away - 0.8805).abs() < 1e-9);
}

#[test]
fn lambdas_are_non_negative_for_non_negative_rates() {
    let store = fake_store();
    let cfg = ModelConfig::default();
    for (xg, goals) in [(1.0, 0.0), (0.0, 1.0), (0.5, 0.5), (0.7, 0.3)] {
        let cfg = ModelConfig {
            weights: BlendWeights::new(xg, goals).unwrap(),
            ..cfg
        };
        let p = predict_fixture(&store, &Fixture::new("Home FC", "Away FC", "Cup"), &cfg, 1.5)
            .unwrap();
        assert!(p.intensities.home >= 0.0 && p.intensities.home.is_finite());
        assert!(p.intensities.away >= 0.0 && p.intensities.away.is_finite());
    }
}

#[test]
fn absent_team_is_an_error_not_a_zero_lambda() {
    let store = fake_store();
    let err = predict_fixture(
        &store,
        &Fixture::new("Home FC", "Ghost United", "Cup"),
        &ModelConfig::default(),
        1.5,
    )
    .unwrap_err();
    assert_eq!(err, ModelError::missing_team("Ghost United"));
    assert!(err.is_missing_data());
}

#[test]
fn team_used_out_of_context_reports_missing_field() {
    // West Ham only carries away rates in the demo table.
    let repo = InMemoryRepository::demo();
    let err = predict_fixture(
        &repo,
        &Fixture::new("West Ham", "Lincoln City", "Premier League"),
        &ModelConfig::default(),
        1.33,
    )
    .unwrap_err();
    assert_eq!(err, ModelError::missing_field("West Ham", RateField::HomeXg));
}

#[test]
fn proxy_policy_is_opt_in() {
    let mut store = fake_store();
    if let Some(away) = store.teams.get_mut("Away FC") {
        away.away_goals_against = None;
    }
    let fixture = Fixture::new("Home FC", "Away FC", "Cup");

    let strict = predict_fixture(&store, &fixture, &ModelConfig::default(), 1.5);
    assert_eq!(
        strict.unwrap_err(),
        ModelError::missing_field("Away FC", RateField::AwayGoalsAgainst)
    );

    let cfg = ModelConfig {
        ga_proxy: GoalsAgainstProxy::ExpectedGoalsAgainst,
        ..ModelConfig::default()
    };
    let p = predict_fixture(&store, &fixture, &cfg, 1.5).unwrap();
    // goals term now uses xGA 1.5 in place of GA.
    assert!((p.intensities.home - (0.7 * 2.0 * 1.5 + 0.3 * 2.2 * 1.5)).abs() < 1e-9);
}

#[test]
fn unsupported_weights_are_rejected_before_lookup_math() {
    let store = fake_store();
    let cfg = ModelConfig {
        weights: BlendWeights { xg: 0.8, goals: 0.3 },
        ..ModelConfig::default()
    };
    let err = predict_fixture(&store, &Fixture::new("Home FC", "Away FC", "Cup"), &cfg, 1.5)
        .unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedWeights { .. }));
}

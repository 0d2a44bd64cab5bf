use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};
use crate::fixtures::{Fixture, SlateEntry};
use crate::intensity::{Intensities, estimate_intensities_with};
use crate::outcome::{PredictionResult, evaluate_fixture};
use crate::repository::TeamStrengthRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub intensities: Intensities,
    pub result: PredictionResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureReport {
    pub fixture: Fixture,
    pub price: f64,
    pub outcome: ModelResult<Prediction>,
}

impl FixtureReport {
    pub fn prediction(&self) -> Option<&Prediction> {
        self.outcome.as_ref().ok()
    }

    pub fn is_value(&self) -> bool {
        self.prediction().is_some_and(|p| p.result.is_value)
    }
}

// `ModelResult` has no natural JSON shape, so reports serialise as
// `{fixture, price, prediction | error}`.
impl Serialize for FixtureReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("FixtureReport", 3)?;
        s.serialize_field("fixture", &self.fixture)?;
        s.serialize_field("price", &self.price)?;
        match &self.outcome {
            Ok(p) => s.serialize_field("prediction", p)?,
            Err(e) => s.serialize_field("error", &e.to_string())?,
        }
        s.end()
    }
}

/// Lookup, estimation and evaluation for one fixture.
pub fn predict_fixture(
    repo: &dyn TeamStrengthRepository,
    fixture: &Fixture,
    config: &ModelConfig,
    price: f64,
) -> ModelResult<Prediction> {
    let home = repo.get_profile(&fixture.home)?;
    let away = repo.get_profile(&fixture.away)?;
    let baseline = repo.get_baseline(&fixture.competition);

    let intensities =
        estimate_intensities_with(home, away, &baseline, config.weights, config.ga_proxy)?;
    let result = evaluate_fixture(intensities.home, intensities.away, price, &config.outcome)?;
    Ok(Prediction {
        intensities,
        result,
    })
}

/// Evaluates every entry independently and in parallel. Results keep the
/// input order; one fixture failing never affects the others.
pub fn evaluate_slate(
    repo: &dyn TeamStrengthRepository,
    entries: &[SlateEntry],
    config: &ModelConfig,
) -> Vec<FixtureReport> {
    let reports: Vec<FixtureReport> = entries
        .par_iter()
        .map(|entry| {
            let price = entry.over_price.unwrap_or(config.over_price);
            FixtureReport {
                fixture: entry.fixture.clone(),
                price,
                outcome: predict_fixture(repo, &entry.fixture, config, price),
            }
        })
        .collect();

    let mut failed = 0usize;
    for report in &reports {
        if let Err(err) = &report.outcome {
            failed += 1;
            log_failure(&report.fixture, err);
        }
    }
    let value = reports.iter().filter(|r| r.is_value()).count();
    info!(
        fixtures = reports.len(),
        failed,
        value_bets = value,
        "slate evaluated"
    );
    reports
}

fn log_failure(fixture: &Fixture, err: &ModelError) {
    if err.is_missing_data() {
        warn!(home = %fixture.home, away = %fixture.away, "fixture skipped: {err}");
    } else {
        warn!(home = %fixture.home, away = %fixture.away, "fixture rejected: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo_slate;
    use crate::repository::InMemoryRepository;

    #[test]
    fn demo_slate_evaluates_every_fixture() {
        let repo = InMemoryRepository::demo();
        let reports = evaluate_slate(&repo, &demo_slate(), &ModelConfig::default());
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.outcome.is_ok()));
        assert_eq!(reports[0].fixture.home, "Bradford City");
        assert_eq!(reports[2].fixture.away, "West Ham");
        assert!(reports.iter().all(|r| r.price == 1.33));
    }

    #[test]
    fn unknown_team_fails_only_its_fixture() {
        let repo = InMemoryRepository::demo();
        let mut slate = demo_slate();
        slate.push(Fixture::new("Genoa", "Nowhere FC", "Serie A").into());
        let reports = evaluate_slate(&repo, &slate, &ModelConfig::default());
        assert_eq!(reports.len(), 4);
        assert!(reports[..3].iter().all(|r| r.outcome.is_ok()));
        assert_eq!(
            reports[3].outcome,
            Err(ModelError::missing_team("Nowhere FC"))
        );
    }

    #[test]
    fn entry_price_overrides_default() {
        let repo = InMemoryRepository::demo();
        let mut slate = demo_slate();
        slate[0].over_price = Some(1.9);
        let reports = evaluate_slate(&repo, &slate, &ModelConfig::default());
        assert_eq!(reports[0].price, 1.9);
        assert_eq!(reports[0].prediction().unwrap().result.price, 1.9);
        assert_eq!(reports[1].price, 1.33);
    }

    #[test]
    fn report_json_carries_error_text() {
        let repo = InMemoryRepository::demo();
        let slate = vec![Fixture::new("Genoa", "Nowhere FC", "Serie A").into()];
        let reports = evaluate_slate(&repo, &slate, &ModelConfig::default());
        let json = serde_json::to_value(&reports).unwrap();
        assert!(json[0]["error"].as_str().unwrap().contains("Nowhere FC"));
        assert!(json[0].get("prediction").is_none());
    }
}

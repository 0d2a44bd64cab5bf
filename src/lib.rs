//! Goal-market prediction: team rates -> Poisson intensities -> over/BTTS/scoreline
//! probabilities and an expected-value verdict against a quoted price.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod intensity;
pub mod logging;
pub mod outcome;
pub mod pipeline;
pub mod poisson;
pub mod rates;
pub mod repository;
pub mod state;

pub use error::{ModelError, ModelResult};
pub use intensity::{BlendWeights, GoalsAgainstProxy, Intensities, estimate_intensities};
pub use outcome::{OutcomeParams, PredictionResult, Scoreline, evaluate_fixture};
pub use repository::{InMemoryRepository, TeamStrengthRepository};

use anyhow::Result;

use crate::config::DataSources;
use crate::fixtures::SlateEntry;

/// Team table and fixture list for a session, from files when configured and
/// the built-in demo data otherwise.
pub fn load_sources(sources: &DataSources) -> Result<(InMemoryRepository, Vec<SlateEntry>)> {
    let repo = match &sources.teams {
        Some(path) => InMemoryRepository::load_json(path)?,
        None => InMemoryRepository::demo(),
    };
    let slate = match &sources.fixtures {
        Some(path) => fixtures::load_slate(path)?,
        None => fixtures::demo_slate(),
    };
    Ok((repo, slate))
}

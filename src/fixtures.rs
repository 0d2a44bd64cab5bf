use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixture {
    pub home: String,
    pub away: String,
    #[serde(alias = "league")]
    pub competition: String,
}

impl Fixture {
    pub fn new(home: impl Into<String>, away: impl Into<String>, competition: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
            competition: competition.into(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} vs {} ({})", self.home, self.away, self.competition)
    }
}

/// A fixture on the day's list, optionally with its own "over" quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlateEntry {
    pub fixture: Fixture,
    pub over_price: Option<f64>,
}

// Flat on-disk shape of a slate entry.
#[derive(Debug, Deserialize)]
struct SlateRow {
    home: String,
    away: String,
    #[serde(alias = "league")]
    competition: String,
    #[serde(default)]
    over_price: Option<f64>,
}

impl From<SlateRow> for SlateEntry {
    fn from(row: SlateRow) -> Self {
        Self {
            fixture: Fixture::new(row.home, row.away, row.competition),
            over_price: row.over_price,
        }
    }
}

impl From<Fixture> for SlateEntry {
    fn from(fixture: Fixture) -> Self {
        Self {
            fixture,
            over_price: None,
        }
    }
}

pub fn demo_slate() -> Vec<SlateEntry> {
    vec![
        Fixture::new("Bradford City", "Lincoln City", "League One").into(),
        Fixture::new("Genoa", "Cremonese", "Serie A").into(),
        Fixture::new("Leeds United", "West Ham", "Premier League").into(),
    ]
}

pub fn parse_slate_json(raw: &str) -> Result<Vec<SlateEntry>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("parse fixture list")?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    let rows: Vec<SlateRow> = serde_json::from_value(value).context("decode fixture list")?;
    Ok(rows.into_iter().map(SlateEntry::from).collect())
}

pub fn load_slate(path: &Path) -> Result<Vec<SlateEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read fixture list {}", path.display()))?;
    parse_slate_json(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_slate_lists_three_fixtures() {
        let slate = demo_slate();
        assert_eq!(slate.len(), 3);
        assert_eq!(slate[1].fixture.title(), "Genoa vs Cremonese (Serie A)");
        assert!(slate.iter().all(|e| e.over_price.is_none()));
    }

    #[test]
    fn slate_json_accepts_league_alias_and_price() {
        let raw = r#"[
            {"home": "Genoa", "away": "Cremonese", "league": "Serie A", "over_price": 1.4},
            {"home": "Leeds United", "away": "West Ham", "competition": "Premier League"}
        ]"#;
        let slate = parse_slate_json(raw).unwrap();
        assert_eq!(slate.len(), 2);
        assert_eq!(slate[0].fixture.competition, "Serie A");
        assert_eq!(slate[0].over_price, Some(1.4));
        assert!(slate[1].over_price.is_none());
    }

    #[test]
    fn null_slate_is_empty() {
        assert!(parse_slate_json("null").unwrap().is_empty());
    }
}

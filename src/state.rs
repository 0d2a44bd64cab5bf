use std::collections::{BTreeSet, VecDeque};

use crate::config::ModelConfig;
use crate::pipeline::FixtureReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Metrics,
    Scores,
    ValueAlert,
    NoValue,
    Unavailable,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    /// Index into `AppState::reports`; `None` for placeholder rows.
    pub fixture: Option<usize>,
    pub kind: LineKind,
    pub text: String,
}

pub struct AppState {
    pub config: ModelConfig,
    pub reports: Vec<FixtureReport>,
    pub selected: usize,
    pub expanded: BTreeSet<usize>,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            reports: Vec::new(),
            selected: 0,
            expanded: BTreeSet::new(),
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Replaces the slate. Selection is clamped and expansion state dropped
    /// for fixtures that no longer exist.
    pub fn set_reports(&mut self, reports: Vec<FixtureReport>) {
        let n = reports.len();
        self.reports = reports;
        self.expanded.retain(|idx| *idx < n);
        self.selected = if n == 0 { 0 } else { self.selected.min(n - 1) };

        let failed = self.reports.iter().filter(|r| r.outcome.is_err()).count();
        let value = self.reports.iter().filter(|r| r.is_value()).count();
        self.push_log(format!(
            "[INFO] Evaluated {n} fixtures ({value} value, {failed} unavailable)"
        ));
        let warnings: Vec<String> = self
            .reports
            .iter()
            .filter_map(|r| {
                r.outcome
                    .as_ref()
                    .err()
                    .map(|err| format!("[WARN] {} vs {}: {err}", r.fixture.home, r.fixture.away))
            })
            .collect();
        for msg in warnings {
            self.push_log(msg);
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.reports.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn toggle_selected(&mut self) {
        if self.reports.is_empty() {
            return;
        }
        if !self.expanded.remove(&self.selected) {
            self.expanded.insert(self.selected);
        }
    }

    /// Expands everything, or collapses everything if all rows are open.
    pub fn toggle_all(&mut self) {
        if self.expanded.len() == self.reports.len() {
            self.expanded.clear();
        } else {
            self.expanded = (0..self.reports.len()).collect();
        }
    }

    pub fn value_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_value()).count()
    }

    pub fn lines(&self) -> Vec<DisplayLine> {
        if self.reports.is_empty() {
            return vec![DisplayLine {
                fixture: None,
                kind: LineKind::Empty,
                text: "No matches today. Check back soon!".to_string(),
            }];
        }

        let mut out = Vec::new();
        for (idx, report) in self.reports.iter().enumerate() {
            let marker = if self.expanded.contains(&idx) { "▾" } else { "▸" };
            out.push(DisplayLine {
                fixture: Some(idx),
                kind: LineKind::Header,
                text: format!("{marker} {}", report.fixture.title()),
            });
            if self.expanded.contains(&idx) {
                out.extend(report_lines(report, &self.config).into_iter().map(|(kind, text)| {
                    DisplayLine {
                        fixture: Some(idx),
                        kind,
                        text,
                    }
                }));
            }
        }
        out
    }
}

/// Detail rows for one fixture.
pub fn report_lines(report: &FixtureReport, config: &ModelConfig) -> Vec<(LineKind, String)> {
    let p = match &report.outcome {
        Ok(p) => &p.result,
        Err(err) => {
            return vec![(LineKind::Unavailable, format!("data unavailable: {err}"))];
        }
    };

    let metrics = format!(
        "λ total {:.2} | {} {} | BTTS Yes {} | EV @{:.2} {}",
        p.total_lambda,
        config.market_label(),
        pct(p.p_over),
        pct(p.p_btts),
        p.price,
        signed_pct(p.ev),
    );

    let scores = if p.top_scores.is_empty() {
        "Top scores: none above report threshold".to_string()
    } else {
        let joined = p
            .top_scores
            .iter()
            .map(|s| format!("{s}: {}", pct(s.prob)))
            .collect::<Vec<_>>()
            .join(" | ");
        format!("Top scores: {joined}")
    };

    let verdict = if p.is_value {
        (
            LineKind::ValueAlert,
            format!(
                "GOAL RUSH ALERT: back {} @{:.2}+ (implied {})",
                config.market_label(),
                p.price,
                pct(p.implied)
            ),
        )
    } else {
        (
            LineKind::NoValue,
            format!("No value here, skip. (implied {})", pct(p.implied)),
        )
    };

    vec![
        (LineKind::Metrics, metrics),
        (LineKind::Scores, scores),
        verdict,
    ]
}

pub fn pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

pub fn signed_pct(p: f64) -> String {
    format!("{:+.1}%", p * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::fixtures::{Fixture, demo_slate};
    use crate::pipeline::evaluate_slate;
    use crate::repository::InMemoryRepository;

    fn demo_state() -> AppState {
        let cfg = ModelConfig::default();
        let reports = evaluate_slate(&InMemoryRepository::demo(), &demo_slate(), &cfg);
        let mut state = AppState::new(cfg);
        state.set_reports(reports);
        state
    }

    #[test]
    fn collapsed_rows_show_only_headers() {
        let state = demo_state();
        let lines = state.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.kind == LineKind::Header));
        assert_eq!(lines[0].text, "▸ Bradford City vs Lincoln City (League One)");
    }

    #[test]
    fn expanding_adds_detail_rows() {
        let mut state = demo_state();
        state.select_next();
        state.toggle_selected();
        let lines = state.lines();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1].kind, LineKind::Header);
        assert!(lines[1].text.starts_with("▾ Genoa"));
        assert_eq!(lines[2].kind, LineKind::Metrics);
        assert!(lines[2].text.contains("Over 1.5"));
        assert!(lines[3].text.starts_with("Top scores: "));
        assert!(matches!(lines[4].kind, LineKind::ValueAlert | LineKind::NoValue));

        state.toggle_selected();
        assert_eq!(state.lines().len(), 3);
    }

    #[test]
    fn toggle_all_round_trips() {
        let mut state = demo_state();
        state.toggle_all();
        assert_eq!(state.expanded.len(), 3);
        state.toggle_all();
        assert!(state.expanded.is_empty());
    }

    #[test]
    fn selection_is_clamped() {
        let mut state = demo_state();
        state.select_prev();
        assert_eq!(state.selected, 0);
        for _ in 0..10 {
            state.select_next();
        }
        assert_eq!(state.selected, 2);
        state.set_reports(Vec::new());
        assert_eq!(state.selected, 0);
        assert_eq!(state.lines()[0].kind, LineKind::Empty);
    }

    #[test]
    fn failed_fixture_renders_unavailable() {
        let cfg = ModelConfig::default();
        let slate = vec![Fixture::new("Genoa", "Nowhere FC", "Serie A").into()];
        let reports = evaluate_slate(&InMemoryRepository::demo(), &slate, &cfg);
        let rows = report_lines(&reports[0], &cfg);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, LineKind::Unavailable);
        assert!(rows[0].1.contains(&ModelError::missing_team("Nowhere FC").to_string()));
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(pct(0.6916), "69.2%");
        assert_eq!(signed_pct(-0.0802), "-8.0%");
        assert_eq!(signed_pct(0.05), "+5.0%");
    }
}

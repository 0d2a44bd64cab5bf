use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::{error, info};

use goal_rush::config::{self, DataSources, ModelConfig};
use goal_rush::logging;
use goal_rush::pipeline::evaluate_slate;
use goal_rush::state::{AppState, DisplayLine, LineKind};

struct App {
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new(config: ModelConfig) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char(' ') => self.state.toggle_selected(),
            KeyCode::Char('a') | KeyCode::Char('A') => self.state.toggle_all(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    /// Re-reads config and data files and re-evaluates the slate.
    fn reload(&mut self) {
        let loaded = ModelConfig::load().and_then(|config| {
            let (repo, slate) = goal_rush::load_sources(&DataSources::from_env())?;
            Ok((config, repo, slate))
        });
        match loaded {
            Ok((config, repo, slate)) => {
                self.state.config = config;
                let reports = evaluate_slate(&repo, &slate, &self.state.config);
                self.state.set_reports(reports);
            }
            Err(err) => {
                error!("reload failed: {err:#}");
                self.state.push_log(format!("[WARN] Reload failed: {err:#}"));
            }
        }
    }
}

fn main() -> Result<()> {
    // the log file path may come from .env, and config loading logs
    config::load_dotenv();
    let log_path = std::env::var(logging::LOG_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(logging::DEFAULT_LOG_FILE));
    logging::init_file(&log_path)?;
    let config = ModelConfig::load()?;

    let (repo, slate) = goal_rush::load_sources(&DataSources::from_env())?;
    info!(teams = repo.len(), fixtures = slate.len(), "session data loaded");

    let mut app = App::new(config);
    let reports = evaluate_slate(&repo, &slate, &app.state.config);
    app.state.set_reports(reports);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_fixtures(frame, chunks[1], &app.state);
    render_console(frame, chunks[2], &app.state);

    let footer = Paragraph::new(
        "j/k/↑/↓ Move | Enter/Space Expand | a Expand all | r Reload | ? Help | q Quit",
    )
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let cfg = &state.config;
    let line1 = format!(
        "  GOAL RUSH PRO | {} | {} fixtures | {} value",
        Local::now().format("%a %d %b %Y"),
        state.reports.len(),
        state.value_count()
    );
    let line2 = format!(
        "  Model: {:.0}% xG + {:.0}% goals | {} @{:.2} | scores > {:.0}%",
        cfg.weights.xg * 100.0,
        cfg.weights.goals * 100.0,
        cfg.market_label(),
        cfg.over_price,
        cfg.outcome.report_threshold * 100.0
    );
    format!("{line1}\n{line2}")
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines = state.lines();
    if area.height == 0 {
        return;
    }

    let visible = area.height as usize;
    let anchor = lines
        .iter()
        .position(|l| l.fixture == Some(state.selected) && l.kind == LineKind::Header)
        .unwrap_or(0);
    let (start, end) = visible_range(anchor, lines.len(), visible);

    let rendered: Vec<Line> = lines[start..end]
        .iter()
        .map(|l| styled_line(l, state.selected))
        .collect();
    frame.render_widget(Paragraph::new(rendered), area);
}

fn styled_line(line: &DisplayLine, selected: usize) -> Line<'static> {
    let is_selected = line.fixture == Some(selected);
    let style = match line.kind {
        LineKind::Header if is_selected => Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
        LineKind::Header => Style::default().add_modifier(Modifier::BOLD),
        LineKind::Metrics => Style::default(),
        LineKind::Scores => Style::default().fg(Color::Gray),
        LineKind::ValueAlert => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        LineKind::NoValue => Style::default().fg(Color::Yellow),
        LineKind::Unavailable | LineKind::Empty => Style::default().fg(Color::DarkGray),
    };
    let indent = if line.kind == LineKind::Header { "" } else { "    " };
    Line::from(Span::styled(format!("{indent}{}", line.text), style))
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let text = state
        .logs
        .iter()
        .rev()
        .take(max_lines)
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    let console = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Goal Rush - Help",
        "",
        "  j/k or ↑/↓      Move between fixtures",
        "  Enter / Space   Expand or collapse fixture",
        "  a               Expand / collapse all",
        "  r               Reload config and data",
        "  ?               Toggle help",
        "  q               Quit",
        "",
        "Over and BTTS probabilities come from two independent",
        "Poisson goal counts; EV = P(over) x price - 1.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

//! Ratatui-based terminal UI.
//!
//! The TUI keeps a selection of funds, draws their aligned NAV lines in one
//! chart, and shows the period table of the focused fund. Funds can be added
//! (by scheme code) and removed while it runs; the granularity is cycled live.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
};
use rust_decimal::prelude::ToPrimitive;

use crate::app::pipeline::{self, DateRange, LoadedFund};
use crate::data::NavSource;
use crate::domain::{CalendarDate, DuplicatePolicy, Granularity, PeriodRow};
use crate::error::AppError;
use crate::report::{NO_DATA, color_for, hex_to_rgb};
use crate::series::{AlignedTable, aggregate};

mod plotters_chart;

use plotters_chart::{ChartLine, NavPlottersChart};

/// Start the TUI with an initial selection of scheme codes.
pub fn run(source: Box<dyn NavSource>, codes: Vec<String>, granularity: Granularity) -> Result<(), AppError> {
    let mut app = App::new(source, granularity);
    app.load_initial(&codes);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    source: Box<dyn NavSource>,
    funds: Vec<LoadedFund>,
    table: AlignedTable,
    granularity: Granularity,
    periods: Vec<PeriodRow>,
    focus: usize,
    code_input: String,
    editing: bool,
    status: String,
}

impl App {
    fn new(source: Box<dyn NavSource>, granularity: Granularity) -> Self {
        Self {
            source,
            funds: Vec::new(),
            table: AlignedTable::default(),
            granularity,
            periods: Vec::new(),
            focus: 0,
            code_input: String::new(),
            editing: false,
            status: "Press a to add a fund by scheme code.".to_string(),
        }
    }

    fn load_initial(&mut self, codes: &[String]) {
        if codes.is_empty() {
            return;
        }
        let run = pipeline::run_compare(self.source.as_ref(), codes, DateRange::default());
        self.funds = run.funds;
        self.table = run.table;
        self.status = match run.failures.first() {
            Some((code, reason)) => format!("{code}: {reason}"),
            None => format!("Loaded {} fund(s) from {}.", self.funds.len(), self.source.name()),
        };
        self.refresh_periods();
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_code_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('a') => {
                self.editing = true;
                self.code_input.clear();
                self.status = "Scheme code: Enter to add, Esc to cancel.".to_string();
            }
            KeyCode::Char('d') | KeyCode::Delete => self.remove_focused(),
            KeyCode::Left | KeyCode::BackTab => {
                if self.focus > 0 {
                    self.focus -= 1;
                    self.refresh_periods();
                }
            }
            KeyCode::Right | KeyCode::Tab => {
                if self.focus + 1 < self.funds.len() {
                    self.focus += 1;
                    self.refresh_periods();
                }
            }
            KeyCode::Char('g') => {
                self.granularity = self.granularity.next();
                self.refresh_periods();
                self.status = format!("granularity: {}", self.granularity.display_name());
            }
            KeyCode::Char('G') => {
                self.granularity = self.granularity.prev();
                self.refresh_periods();
                self.status = format!("granularity: {}", self.granularity.display_name());
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn handle_code_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Add canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                let code = self.code_input.trim().to_string();
                self.add_fund(&code);
            }
            KeyCode::Backspace => {
                self.code_input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_alphanumeric() => self.code_input.push(c),
            _ => {}
        }
    }

    fn add_fund(&mut self, code: &str) {
        if code.is_empty() {
            self.status = "No code entered.".to_string();
            return;
        }
        if self.funds.iter().any(|f| f.fund.code == code) {
            self.status = format!("{code} is already selected.");
            return;
        }

        match pipeline::load_fund(self.source.as_ref(), code, DateRange::default()) {
            Ok(loaded) => {
                self.status = format!("Added {} ({} records).", loaded.fund.name, loaded.records.len());
                self.funds.push(loaded);
                self.focus = self.funds.len() - 1;
                self.realign();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn remove_focused(&mut self) {
        if self.focus >= self.funds.len() {
            self.status = "Nothing to remove.".to_string();
            return;
        }
        let removed = self.funds.remove(self.focus);
        self.focus = self.focus.min(self.funds.len().saturating_sub(1));
        self.status = format!("Removed {}.", removed.fund.code);
        self.realign();
    }

    fn reload(&mut self) {
        let codes: Vec<String> = self.funds.iter().map(|f| f.fund.code.clone()).collect();
        if codes.is_empty() {
            self.status = "No funds selected.".to_string();
            return;
        }
        self.load_initial(&codes);
        self.focus = self.focus.min(self.funds.len().saturating_sub(1));
        self.refresh_periods();
    }

    fn realign(&mut self) {
        self.table = pipeline::align_loaded(&self.funds);
        self.refresh_periods();
    }

    fn refresh_periods(&mut self) {
        self.periods = match self.funds.get(self.focus) {
            Some(fund) => aggregate(&fund.records, self.granularity, DuplicatePolicy::CountAll),
            None => Vec::new(),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut title = vec![
            Span::styled("nav", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " · {} · {} · {} aligned dates",
                self.source.name(),
                self.granularity.display_name(),
                self.table.rows.len()
            )),
        ];
        if self.editing {
            title.push(Span::styled(
                format!(" · add: {}_", self.code_input),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
        }

        let mut legend: Vec<Span> = Vec::new();
        for (i, fund) in self.funds.iter().enumerate() {
            let mut style = Style::default().fg(rgb(color_for(i)));
            if i == self.focus {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            legend.push(Span::styled(format!(" {} ", fund.fund.code), style));
            legend.push(Span::raw(" "));
        }
        if legend.is_empty() {
            legend.push(Span::styled("no funds selected", Style::default().fg(Color::Gray)));
        }

        let p = Paragraph::new(Text::from(vec![Line::from(title), Line::from(legend)]))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_periods(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("NAV").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some((lines, x_bounds, y_bounds)) = chart_lines(&self.table) else {
            let msg = Paragraph::new(NO_DATA)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = NavPlottersChart {
            lines: &lines,
            x_bounds,
            y_bounds,
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_nav,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_periods(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.funds.get(self.focus) {
            Some(fund) => format!("{} · {}", fund.fund.code, self.granularity.display_name()),
            None => self.granularity.display_name().to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.periods.is_empty() {
            let msg = Paragraph::new(NO_DATA)
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        // Most recent periods fit on screen first.
        let rows = self.periods.iter().rev().map(|r| {
            Row::new(vec![r.period.clone(), r.avg_nav.to_string(), r.count.to_string()])
        });
        let table = Table::new(
            rows,
            [Constraint::Length(11), Constraint::Length(11), Constraint::Length(5)],
        )
        .header(
            Row::new(vec!["Period", "Avg NAV", "n"])
                .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
        )
        .block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "a add  d remove  ←/→ focus  g/G granularity  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn rgb(hex: &str) -> Color {
    hex_to_rgb(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::White)
}

/// Build one chart line per aligned column, plus padded bounds.
///
/// Returns `None` when there is not a single plottable value.
fn chart_lines(table: &AlignedTable) -> Option<(Vec<ChartLine>, [f64; 2], [f64; 2])> {
    let mut lines = Vec::with_capacity(table.codes.len());
    for col in 0..table.codes.len() {
        let points: Vec<(f64, f64)> = table
            .rows
            .iter()
            .filter_map(|row| Some((day_number(row.day)?, row.values[col]?.to_f64()?)))
            .collect();
        let color = hex_to_rgb(color_for(col)).unwrap_or((255, 255, 255));
        lines.push(ChartLine { points, color });
    }

    let all = || lines.iter().flat_map(|l| l.points.iter());
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in all() {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && y_min.is_finite()) {
        return None;
    }

    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-12);

    Some((lines, [x_min, x_max], [y_min - pad, y_max + pad]))
}

fn day_number(date: CalendarDate) -> Option<f64> {
    use chrono::Datelike;
    date.to_naive().map(|d| d.num_days_from_ce() as f64)
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d-%m-%y").to_string())
        .unwrap_or_default()
}

fn fmt_axis_nav(v: f64) -> String {
    format!("{v:.1}")
}

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::period::{PeriodKey, PeriodMode};
use crate::models::summary::Totals;
use crate::operations::summary::{format_money, sorted_breakdown};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style},
    style::Modifier,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};
use ratatui::widgets::canvas::{Canvas, Points};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::io;

/// Opens the trend chart with the expense pie of the latest period. Returns
/// the mode the user left the view in.
pub fn run_report(ledger: &Ledger, mode: PeriodMode, symbol: &str) -> Result<PeriodMode> {
    if ledger.is_empty() {
        return Err(Error::EmptyLedger);
    }

    enable_raw_mode().map_err(|e| Error::Terminal(format!("Failed to enable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| Error::Terminal(format!("Failed to enter alternate screen: {}", e)))?;

    let result: Result<PeriodMode> = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| Error::Terminal(format!("Failed to initialize terminal: {}", e)))?;

        let mut state = ReportState::new(ledger, mode);

        loop {
            let data = build_report(ledger, state.mode, state.selected);
            terminal
                .draw(|frame| {
                    let size = frame.area();
                    let layout = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([
                            Constraint::Percentage(55),
                            Constraint::Percentage(45),
                        ])
                        .split(size);

                    render_trend_chart(frame, layout[0], &data, symbol);

                    let bottom = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([
                            Constraint::Percentage(50),
                            Constraint::Percentage(50),
                        ])
                        .split(layout[1]);

                    render_pie_chart(frame, bottom[0], &data);
                    render_breakdown_table(frame, bottom[1], &data, symbol);
                })
                .map_err(|e| Error::Terminal(format!("Failed to draw terminal UI: {}", e)))?;

            if event::poll(std::time::Duration::from_millis(250))
                .map_err(|e| Error::Terminal(format!("Failed to poll input: {}", e)))?
            {
                match event::read().map_err(|e| Error::Terminal(format!("Failed to read input: {}", e)))? {
                    Event::Key(key) if key.kind == KeyEventKind::Release => {}
                    Event::Key(key) => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left => state.select_previous(),
                        KeyCode::Right => state.select_next(),
                        KeyCode::Char('m') => state.toggle_mode(ledger),
                        _ => {}
                    },
                    _ => {}
                }
            }
        }

        Ok(state.mode)
    })();

    disable_raw_mode().map_err(|e| Error::Terminal(format!("Failed to disable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| Error::Terminal(format!("Failed to leave alternate screen: {}", e)))?;

    result
}

struct ReportState {
    mode: PeriodMode,
    periods: Vec<PeriodKey>,
    selected: usize,
}

impl ReportState {
    fn new(ledger: &Ledger, mode: PeriodMode) -> Self {
        let periods = ledger.periods(mode);
        let selected = periods.len().saturating_sub(1);
        Self {
            mode,
            periods,
            selected,
        }
    }

    fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(self.periods.len().saturating_sub(1));
    }

    fn toggle_mode(&mut self, ledger: &Ledger) {
        *self = ReportState::new(ledger, self.mode.toggle());
    }
}

struct ReportData {
    mode: PeriodMode,
    periods: Vec<(PeriodKey, Totals)>,
    selected: Option<PeriodKey>,
    breakdown: Vec<(String, Decimal)>,
    colors: HashMap<String, Color>,
    total_spend: Decimal,
}

fn build_report(ledger: &Ledger, mode: PeriodMode, selected: usize) -> ReportData {
    let periods: Vec<(PeriodKey, Totals)> = ledger.aggregate(mode).into_iter().collect();
    let selected = periods
        .get(selected)
        .or_else(|| periods.last())
        .map(|(key, _)| *key);

    let breakdown = match selected {
        Some(key) => sorted_breakdown(&ledger.expense_breakdown(mode, key)),
        None => Vec::new(),
    };

    let mut descriptions: Vec<String> = breakdown.iter().map(|(d, _)| d.clone()).collect();
    descriptions.sort();
    let colors = assign_colors(&descriptions);

    let total_spend = breakdown
        .iter()
        .fold(Decimal::ZERO, |acc, (_, v)| acc + *v);

    ReportData {
        mode,
        periods,
        selected,
        breakdown,
        colors,
        total_spend,
    }
}

fn assign_colors(descriptions: &[String]) -> HashMap<String, Color> {
    let palette = [
        Color::Cyan,
        Color::Magenta,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Red,
        Color::LightCyan,
        Color::LightMagenta,
        Color::LightYellow,
        Color::LightGreen,
        Color::LightBlue,
    ];

    descriptions
        .iter()
        .enumerate()
        .map(|(idx, description)| (description.clone(), palette[idx % palette.len()]))
        .collect()
}

/// One `(x, y)` series per line of the trend chart: income, expense, net.
fn trend_series(periods: &[(PeriodKey, Totals)]) -> [Vec<(f64, f64)>; 3] {
    let point = |idx: usize, value: Decimal| (idx as f64, value.to_f64().unwrap_or(0.0));
    let income = periods
        .iter()
        .enumerate()
        .map(|(i, (_, t))| point(i, t.total_income))
        .collect();
    let expense = periods
        .iter()
        .enumerate()
        .map(|(i, (_, t))| point(i, t.total_expense))
        .collect();
    let net = periods
        .iter()
        .enumerate()
        .map(|(i, (_, t))| point(i, t.net))
        .collect();
    [income, expense, net]
}

/// Y range covering every series and zero, never degenerate.
fn y_bounds(series: &[Vec<(f64, f64)>]) -> [f64; 2] {
    let (min, max) = series
        .iter()
        .flatten()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if max - min < 1.0 {
        [min, min + 1.0]
    } else {
        [min, max]
    }
}

fn x_labels(periods: &[(PeriodKey, Totals)]) -> Vec<String> {
    match periods {
        [] => vec![],
        [only] => vec![only.0.to_string()],
        [first, .., last] if periods.len() == 2 => vec![first.0.to_string(), last.0.to_string()],
        [first, .., last] => vec![
            first.0.to_string(),
            periods[periods.len() / 2].0.to_string(),
            last.0.to_string(),
        ],
    }
}

fn axis_label(value: f64) -> String {
    let value = Decimal::from_f64_retain(value).unwrap_or_default();
    format_money(value, "").trim_start().to_string()
}

fn render_trend_chart(frame: &mut ratatui::Frame, area: Rect, data: &ReportData, symbol: &str) {
    let [income, expense, net] = trend_series(&data.periods);
    let bounds = y_bounds(&[income.clone(), expense.clone(), net.clone()]);
    let x_max = data.periods.len().saturating_sub(1).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("Income")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&income),
        Dataset::default()
            .name("Expense")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&expense),
        Dataset::default()
            .name("Net")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&net),
    ];

    let title = format!(
        "{} trend  (←/→ select period, m switch mode, q exit)",
        data.mode
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(Line::from(vec![Span::styled(
                    title,
                    Style::default().fg(Color::White),
                )]))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title(data.mode.unit())
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels(&data.periods)),
        )
        .y_axis(
            Axis::default()
                .title(symbol.to_string())
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds)
                .labels(vec![axis_label(bounds[0]), axis_label(bounds[1])]),
        );

    frame.render_widget(chart, area);
}

/// Start angle, end angle and description of every slice, in radians.
fn pie_slices(breakdown: &[(String, Decimal)], total: Decimal) -> Vec<(f64, f64, String)> {
    let total = total.to_f64().filter(|t| *t > 0.0).unwrap_or(1.0);
    let mut slices = Vec::new();
    let mut start_angle = 0.0_f64;
    for (description, amount) in breakdown {
        let ratio = amount.to_f64().unwrap_or(0.0) / total;
        let sweep = ratio * std::f64::consts::TAU;
        slices.push((start_angle, start_angle + sweep, description.clone()));
        start_angle += sweep;
    }
    slices
}

fn render_pie_chart(frame: &mut ratatui::Frame, area: Rect, data: &ReportData) {
    let title = match data.selected {
        Some(key) => format!("Expenses {}", key),
        None => "Expenses".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if data.total_spend <= Decimal::ZERO {
        let empty = Paragraph::new("No expenses in this period")
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let slices = pie_slices(&data.breakdown, data.total_spend);

    let canvas = Canvas::default()
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            let step = 0.04;
            for (start, end, description) in &slices {
                let color = data
                    .colors
                    .get(description)
                    .copied()
                    .unwrap_or(Color::White);
                let mut points = Vec::new();
                let mut r = 0.0;
                while r <= 1.0 {
                    let mut angle = *start;
                    while angle <= *end {
                        points.push((r * angle.cos(), r * angle.sin()));
                        angle += 0.05;
                    }
                    r += step;
                }
                if !points.is_empty() {
                    ctx.draw(&Points { coords: &points, color });
                }
            }
        });

    frame.render_widget(canvas, inner);
}

fn render_breakdown_table(frame: &mut ratatui::Frame, area: Rect, data: &ReportData, symbol: &str) {
    let block = Block::default()
        .title("Expense Breakdown")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if data.breakdown.is_empty() {
        let empty = Paragraph::new("No expenses in this period")
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:20}", "Description"), bold),
        Span::raw("  "),
        Span::styled(format!("{:>16}", "Amount"), bold),
    ])];

    for (description, amount) in &data.breakdown {
        let color = data
            .colors
            .get(description)
            .copied()
            .unwrap_or(Color::White);
        lines.push(Line::from(vec![
            Span::styled(format!("{:20}", description), Style::default().fg(color)),
            Span::raw("  "),
            Span::styled(
                format!("{:>16}", format_money(*amount, symbol)),
                Style::default().fg(color),
            ),
        ]));
    }

    lines.push(Line::from(vec![
        Span::styled(format!("{:20}", "Total"), bold),
        Span::raw("  "),
        Span::styled(format!("{:>16}", format_money(data.total_spend, symbol)), bold),
    ]));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Left);
    frame.render_widget(paragraph, inner);
}

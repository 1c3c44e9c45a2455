use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::period::{PeriodKey, PeriodMode};
use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::summary::format_money;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use std::cmp::{max, min};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Entered,
    DateAsc,
    DateDesc,
}

impl SortOrder {
    fn next(self) -> Self {
        match self {
            SortOrder::Entered => SortOrder::DateAsc,
            SortOrder::DateAsc => SortOrder::DateDesc,
            SortOrder::DateDesc => SortOrder::Entered,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortOrder::Entered => "entered",
            SortOrder::DateAsc => "date ↑",
            SortOrder::DateDesc => "date ↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    Details,
    PeriodInput,
}

struct BrowseState<'a> {
    ledger: &'a Ledger,
    mode: Mode,
    period_mode: PeriodMode,

    filtered_indices: Vec<usize>,
    table_state: TableState,

    filter_type: Option<TransactionType>,
    filter_period: Option<PeriodKey>,
    sort_order: SortOrder,

    input_buffer: String,
    input_error: Option<String>,

    // Cached per-draw
    last_page_size: usize,
}

impl<'a> BrowseState<'a> {
    fn new(ledger: &'a Ledger, period_mode: PeriodMode) -> Self {
        let mut state = Self {
            ledger,
            mode: Mode::List,
            period_mode,
            filtered_indices: Vec::new(),
            table_state: TableState::default(),
            filter_type: None,
            filter_period: None,
            sort_order: SortOrder::Entered,
            input_buffer: String::new(),
            input_error: None,
            last_page_size: 10,
        };
        state.recompute();
        state
    }

    fn selected_transaction(&self) -> Option<&'a Transaction> {
        let selected = self.table_state.selected()?;
        let idx = *self.filtered_indices.get(selected)?;
        self.ledger.transactions().get(idx)
    }

    fn recompute(&mut self) {
        let ledger = self.ledger;
        let transactions = ledger.transactions();
        self.filtered_indices = (0..transactions.len())
            .filter(|&i| self.matches_filters(&transactions[i]))
            .collect();

        match self.sort_order {
            SortOrder::Entered => {}
            SortOrder::DateAsc => self
                .filtered_indices
                .sort_by(|&a, &b| transactions[a].date.cmp(&transactions[b].date).then(a.cmp(&b))),
            SortOrder::DateDesc => self
                .filtered_indices
                .sort_by(|&a, &b| transactions[b].date.cmp(&transactions[a].date).then(b.cmp(&a))),
        }

        if self.filtered_indices.is_empty() {
            self.table_state.select(None);
        } else {
            let new_selected = match self.table_state.selected() {
                Some(sel) => min(sel, self.filtered_indices.len().saturating_sub(1)),
                None => 0,
            };
            self.table_state.select(Some(new_selected));
        }
    }

    fn matches_filters(&self, tx: &Transaction) -> bool {
        if let Some(t) = self.filter_type {
            if tx.transaction_type != t {
                return false;
            }
        }

        if let Some(period) = self.filter_period {
            if self.ledger.period_key(tx, self.period_mode) != period {
                return false;
            }
        }

        true
    }

    fn move_selection(&mut self, delta: i32) {
        if self.filtered_indices.is_empty() {
            self.table_state.select(None);
            return;
        }

        let current = self.table_state.selected().unwrap_or(0) as i32;
        let max_index = self.filtered_indices.len().saturating_sub(1) as i32;
        let next = (current + delta).clamp(0, max_index) as usize;
        self.table_state.select(Some(next));
    }

    fn page_up(&mut self) {
        let page = max(1, self.last_page_size) as i32;
        self.move_selection(-page);
    }

    fn page_down(&mut self) {
        let page = max(1, self.last_page_size) as i32;
        self.move_selection(page);
    }

    fn cycle_type_filter(&mut self) {
        self.filter_type = match self.filter_type {
            None => Some(TransactionType::Expense),
            Some(TransactionType::Expense) => Some(TransactionType::Income),
            Some(TransactionType::Income) => None,
        };
        self.recompute();
    }

    fn cycle_sort(&mut self) {
        self.sort_order = self.sort_order.next();
        self.recompute();
    }

    fn clear_filters(&mut self) {
        self.filter_type = None;
        self.filter_period = None;
        self.recompute();
    }

    fn start_period_input(&mut self) {
        self.input_buffer = self
            .filter_period
            .map(|p| p.to_string())
            .unwrap_or_default();
        self.input_error = None;
        self.mode = Mode::PeriodInput;
    }

    fn cancel_input(&mut self) {
        self.input_error = None;
        self.mode = Mode::List;
    }

    fn commit_period_input(&mut self) {
        let raw = self.input_buffer.trim();
        if raw.is_empty() {
            self.filter_period = None;
            self.mode = Mode::List;
            self.recompute();
            return;
        }

        match PeriodKey::parse_for(raw, self.period_mode, self.ledger.week_key()) {
            Ok(period) => {
                self.filter_period = Some(period);
                self.input_error = None;
                self.mode = Mode::List;
                self.recompute();
            }
            Err(e) => self.input_error = Some(e),
        }
    }
}

pub fn run_browse(ledger: &Ledger, period_mode: PeriodMode, symbol: &str) -> Result<()> {
    if ledger.is_empty() {
        return Err(Error::EmptyLedger);
    }

    enable_raw_mode().map_err(|e| Error::Terminal(format!("Failed to enable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| Error::Terminal(format!("Failed to enter alternate screen: {}", e)))?;

    let result: Result<()> = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| Error::Terminal(format!("Failed to initialize terminal: {}", e)))?;

        let mut state = BrowseState::new(ledger, period_mode);

        loop {
            terminal
                .draw(|frame| {
                    let size = frame.area();
                    let layout = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([
                            Constraint::Length(3),
                            Constraint::Min(5),
                            Constraint::Length(3),
                        ])
                        .split(size);

                    render_header(frame, layout[0], &state);
                    render_table(frame, layout[1], &mut state, symbol);
                    render_footer(frame, layout[2], &state);

                    if state.mode == Mode::PeriodInput {
                        render_input_modal(frame, size, &state);
                    }

                    if state.mode == Mode::Details {
                        render_details_modal(frame, size, &state, symbol);
                    }
                })
                .map_err(|e| Error::Terminal(format!("Failed to draw terminal UI: {}", e)))?;

            if event::poll(std::time::Duration::from_millis(200))
                .map_err(|e| Error::Terminal(format!("Failed to poll input: {}", e)))?
            {
                let event = event::read()
                    .map_err(|e| Error::Terminal(format!("Failed to read input: {}", e)))?;
                if let Event::Key(key) = event {
                    if handle_key(&mut state, key) {
                        break;
                    }
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode().map_err(|e| Error::Terminal(format!("Failed to disable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| Error::Terminal(format!("Failed to leave alternate screen: {}", e)))?;

    result
}

/// Returns true when the view should close.
fn handle_key(state: &mut BrowseState, key: KeyEvent) -> bool {
    // Many terminals emit both a Press and a Release event. Only act on Press/Repeat.
    if key.kind == KeyEventKind::Release {
        return false;
    }

    match state.mode {
        Mode::List => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => state.move_selection(-1),
            KeyCode::Down => state.move_selection(1),
            KeyCode::PageUp => state.page_up(),
            KeyCode::PageDown => state.page_down(),
            KeyCode::Home => state.move_selection(i32::MIN / 2),
            KeyCode::End => state.move_selection(i32::MAX / 2),
            KeyCode::Enter => {
                if state.selected_transaction().is_some() {
                    state.mode = Mode::Details;
                }
            }
            KeyCode::Char('p') => state.start_period_input(),
            KeyCode::Char('t') => state.cycle_type_filter(),
            KeyCode::Char('s') => state.cycle_sort(),
            KeyCode::Char('x') => state.clear_filters(),
            _ => {}
        },
        Mode::Details => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b')) {
                state.mode = Mode::List;
            }
        }
        Mode::PeriodInput => {
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
            {
                state.cancel_input();
                return false;
            }

            match key.code {
                KeyCode::Esc => state.cancel_input(),
                KeyCode::Enter => state.commit_period_input(),
                KeyCode::Backspace => {
                    state.input_buffer.pop();
                }
                KeyCode::Char(ch) => state.input_buffer.push(ch),
                _ => {}
            }
        }
    }

    false
}

fn type_label(filter: Option<TransactionType>) -> &'static str {
    filter.map(TransactionType::label).unwrap_or("(any)")
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let period = state
        .filter_period
        .map(|p| p.to_string())
        .unwrap_or_else(|| "(any)".to_string());

    let line = Line::from(vec![
        Span::styled(
            "Transactions",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("Sort: {}", state.sort_order.label()), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::raw(format!("Type: {}", type_label(state.filter_type))),
        Span::raw("  |  "),
        Span::raw(format!("{}: {}", state.period_mode.unit(), period)),
        Span::raw("  |  "),
        Span::raw(format!("Rows: {}", state.filtered_indices.len())),
    ]);

    let block = Block::default().borders(Borders::ALL);
    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let hint = match state.mode {
        Mode::List => "↑/↓ move  PgUp/PgDn page  Enter details  p period  t type  s sort  x clear  q/Esc exit",
        Mode::Details => "Esc/q/b back",
        Mode::PeriodInput => "Type, Enter apply, Esc cancel",
    };

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(hint)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn truncate_description(description: &str, width: usize) -> String {
    if description.chars().count() <= width {
        return description.to_string();
    }
    let mut short: String = description.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

fn render_table(frame: &mut ratatui::Frame, area: Rect, state: &mut BrowseState, symbol: &str) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Row::new([
        Cell::from("Date").style(bold),
        Cell::from("Type").style(bold),
        Cell::from("Description").style(bold),
        Cell::from("Amount").style(bold),
    ])
    .style(Style::default().fg(Color::White));

    let ledger = state.ledger;
    let transactions = ledger.transactions();
    let rows = state
        .filtered_indices
        .iter()
        .map(|&idx| &transactions[idx])
        .map(|tx| {
            let color = match tx.transaction_type {
                TransactionType::Income => Color::Green,
                TransactionType::Expense => Color::Red,
            };
            Row::new([
                Cell::from(tx.date.format("%Y-%m-%d").to_string()),
                Cell::from(tx.transaction_type.label()).style(Style::default().fg(color)),
                Cell::from(truncate_description(&tx.description, 42)),
                Cell::from(format_money(tx.amount, symbol)),
            ])
        });

    // Leave room for the header row.
    state.last_page_size = max(1, inner.height.saturating_sub(2) as usize);

    let widths = [
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Percentage(50),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ")
        .column_spacing(1);

    frame.render_stateful_widget(table, inner, &mut state.table_state);

    if state.filtered_indices.is_empty() {
        let empty = Paragraph::new("No transactions match the current filters")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
    }
}

fn render_input_modal(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let popup_area = centered_rect(80, 30, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(vec![Span::styled(
            format!("Filter {}", state.period_mode.unit()),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("Enter 2024-02, 2024-W05 or a week number (empty clears)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("> {}", state.input_buffer),
            Style::default().fg(Color::Yellow),
        )]),
    ];

    if let Some(ref err) = state.input_error {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )]));
    }

    let block = Block::default().borders(Borders::ALL).title("Input");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

fn render_details_modal(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState, symbol: &str) {
    let popup_area = centered_rect(90, 60, area);
    frame.render_widget(Clear, popup_area);

    let Some(tx) = state.selected_transaction() else {
        frame.render_widget(
            Paragraph::new("No selection")
                .block(Block::default().borders(Borders::ALL).title("Details"))
                .alignment(Alignment::Center),
            popup_area,
        );
        return;
    };

    let lines = vec![
        Line::from(vec![Span::styled(
            "Transaction Details",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(format!("Date: {}", tx.date.format("%Y-%m-%d"))),
        Line::from(format!(
            "Period: {}",
            state.ledger.period_key(tx, state.period_mode)
        )),
        Line::from(format!("Type: {}", tx.transaction_type)),
        Line::from(format!("Amount: {}", format_money(tx.amount, symbol))),
        Line::from(""),
        Line::from("Description:"),
        Line::from(tx.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Esc/q/b to go back",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title("Details");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use chrono::NaiveDate;

    fn create_test_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let entries = [
            ((2024, 2, 1), TransactionType::Expense, "Books", 200000),
            ((2024, 1, 10), TransactionType::Income, "Allowance", 500000),
            ((2024, 1, 15), TransactionType::Expense, "Food", 150000),
        ];
        for ((y, m, d), kind, description, amount) in entries {
            ledger
                .append(Transaction::new(
                    NaiveDate::from_ymd_opt(y, m, d).expect("Invalid date"),
                    kind,
                    description,
                    Decimal::new(amount, 0),
                ))
                .unwrap();
        }
        ledger
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn visible_descriptions(state: &BrowseState) -> Vec<String> {
        state
            .filtered_indices
            .iter()
            .map(|&i| state.ledger.transactions()[i].description.clone())
            .collect()
    }

    #[test]
    fn test_browse_defaults_to_entered_order() {
        let ledger = create_test_ledger();
        let state = BrowseState::new(&ledger, PeriodMode::Monthly);
        assert_eq!(visible_descriptions(&state), vec!["Books", "Allowance", "Food"]);
        assert_eq!(state.table_state.selected(), Some(0));
    }

    #[test]
    fn test_browse_sort_cycles() {
        let ledger = create_test_ledger();
        let mut state = BrowseState::new(&ledger, PeriodMode::Monthly);
        state.cycle_sort();
        assert_eq!(visible_descriptions(&state), vec!["Allowance", "Food", "Books"]);
        state.cycle_sort();
        assert_eq!(visible_descriptions(&state), vec!["Books", "Food", "Allowance"]);
        state.cycle_sort();
        assert_eq!(state.sort_order, SortOrder::Entered);
    }

    #[test]
    fn test_browse_type_filter_cycle() {
        let ledger = create_test_ledger();
        let mut state = BrowseState::new(&ledger, PeriodMode::Monthly);
        state.cycle_type_filter();
        assert_eq!(visible_descriptions(&state), vec!["Books", "Food"]);
        state.cycle_type_filter();
        assert_eq!(visible_descriptions(&state), vec!["Allowance"]);
        state.cycle_type_filter();
        assert_eq!(state.filtered_indices.len(), 3);
    }

    #[test]
    fn test_browse_period_filter_via_input() {
        let ledger = create_test_ledger();
        let mut state = BrowseState::new(&ledger, PeriodMode::Monthly);

        handle_key(&mut state, key(KeyCode::Char('p')));
        assert_eq!(state.mode, Mode::PeriodInput);
        for ch in "2024-01".chars() {
            handle_key(&mut state, key(KeyCode::Char(ch)));
        }
        handle_key(&mut state, key(KeyCode::Enter));

        assert_eq!(state.mode, Mode::List);
        assert_eq!(state.filter_period, Some(PeriodKey::Month { year: 2024, month: 1 }));
        assert_eq!(visible_descriptions(&state), vec!["Allowance", "Food"]);

        state.clear_filters();
        assert_eq!(state.filtered_indices.len(), 3);
    }

    #[test]
    fn test_browse_invalid_period_keeps_modal_open() {
        let ledger = create_test_ledger();
        let mut state = BrowseState::new(&ledger, PeriodMode::Monthly);
        state.start_period_input();
        state.input_buffer = "2024-13".to_string();
        state.commit_period_input();
        assert_eq!(state.mode, Mode::PeriodInput);
        assert!(state.input_error.is_some());
        assert_eq!(state.filter_period, None);
    }

    #[test]
    fn test_browse_period_of_other_mode_keeps_modal_open() {
        let ledger = create_test_ledger();
        let mut state = BrowseState::new(&ledger, PeriodMode::Monthly);
        state.start_period_input();
        state.input_buffer = "2024-W05".to_string();
        state.commit_period_input();
        assert_eq!(state.mode, Mode::PeriodInput);
        assert!(state.input_error.as_deref().is_some_and(|e| e.contains("does not fit")));
        assert_eq!(state.filter_period, None);
        assert_eq!(state.filtered_indices.len(), 3);
    }

    #[test]
    fn test_browse_selection_clamped() {
        let ledger = create_test_ledger();
        let mut state = BrowseState::new(&ledger, PeriodMode::Monthly);
        state.move_selection(10);
        assert_eq!(state.table_state.selected(), Some(2));
        handle_key(&mut state, key(KeyCode::Home));
        assert_eq!(state.table_state.selected(), Some(0));
        assert_eq!(state.selected_transaction().map(|t| t.description.as_str()), Some("Books"));
    }

    #[test]
    fn test_browse_details_and_quit_keys() {
        let ledger = create_test_ledger();
        let mut state = BrowseState::new(&ledger, PeriodMode::Monthly);
        assert!(!handle_key(&mut state, key(KeyCode::Enter)));
        assert_eq!(state.mode, Mode::Details);
        assert!(!handle_key(&mut state, key(KeyCode::Char('q'))));
        assert_eq!(state.mode, Mode::List);
        assert!(handle_key(&mut state, key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("Food", 42), "Food");
        assert_eq!(truncate_description("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_run_browse_refuses_empty_ledger() {
        let result = run_browse(&Ledger::new(), PeriodMode::Monthly, "Rp");
        assert!(matches!(result, Err(Error::EmptyLedger)));
    }
}

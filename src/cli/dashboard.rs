use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::seq::SliceRandom;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    DefaultTerminal, Frame,
};
use tracing::info;

use super::{connect, parse_deal_form, parse_goal_form, today};
use crate::advisor::Advisor;
use crate::fmt::{bar, compact_money};
use crate::models::{weekday_label, DealRequest, Panel, SavingsGoal, WEEKDAYS};
use crate::session::{DashboardData, PanelState, Session};
use crate::settings::load_settings;
use crate::tui::{
    heat_color, money_span, panel_text, wrap_text, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE, STATUS_STYLE,
    TITLE_STYLE,
};

const GREETINGS: &[&str] = &[
    "Let's see where the money went.",
    "Every dollar has a story.",
    "Coffee budget check, anyone?",
    "Small changes add up.",
    "Back again? Good habit.",
    "Another month, another statement.",
    "Numbers don't lie. They do exaggerate sometimes.",
    "Pull up a chair.",
    "Future you says thanks.",
    "Ready when you are.",
];

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    Patterns,
    Subscriptions,
    Goal,
    Deals,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Patterns,
        Tab::Subscriptions,
        Tab::Goal,
        Tab::Deals,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Patterns => "Spending Patterns",
            Tab::Subscriptions => "Subscriptions",
            Tab::Goal => "Savings Goal",
            Tab::Deals => "Deals & Discounts",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn is_form(self) -> bool {
        matches!(self, Tab::Goal | Tab::Deals)
    }
}

struct FormField {
    label: &'static str,
    value: String,
}

struct Form {
    fields: Vec<FormField>,
    focused: usize,
    error: Option<String>,
}

impl Form {
    fn new(labels: &[&'static str]) -> Self {
        Self {
            fields: labels
                .iter()
                .map(|&label| FormField {
                    label,
                    value: String::new(),
                })
                .collect(),
            focused: 0,
            error: None,
        }
    }

    fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|f| f.value.as_str()).unwrap_or("")
    }
}

const GOAL_AMOUNT_IDX: usize = 0;
const GOAL_DATE_IDX: usize = 1;
const DEAL_OCCUPATION_IDX: usize = 0;
const DEAL_AGE_IDX: usize = 1;

/// Work queued by a key press. Executed after the next draw so the footer
/// shows what the dashboard is waiting on.
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Open(PathBuf),
    Advice,
    Subscriptions,
    SubscriptionSavings,
    Goal(SavingsGoal),
    Deals(DealRequest),
}

impl Pending {
    fn describe(&self) -> String {
        match self {
            Pending::Open(path) => format!("Loading {}...", path.display()),
            Pending::Advice => "Asking for budgeting advice...".into(),
            Pending::Subscriptions => "Looking for subscriptions...".into(),
            Pending::SubscriptionSavings => "Estimating subscription savings...".into(),
            Pending::Goal(_) => "Checking your savings goal...".into(),
            Pending::Deals(_) => "Searching for deals...".into(),
        }
    }
}

struct Dashboard<A: Advisor> {
    session: Session<A>,
    tab: Tab,
    greeting: String,
    today: NaiveDate,
    goal_form: Form,
    deals_form: Form,
    /// Path being typed into the open-file prompt.
    opening: Option<String>,
    pending: Option<Pending>,
    status_message: Option<String>,
    /// Row offset for tables.
    scroll: usize,
    /// Line offset for advisory text.
    text_scroll: u16,
}

impl<A: Advisor> Dashboard<A> {
    fn new(session: Session<A>, user_name: &str, today: NaiveDate) -> Self {
        let mut rng = rand::thread_rng();
        let random_greeting = GREETINGS.choose(&mut rng).unwrap_or(&"Hello.");
        let first_name = user_name.split_whitespace().next().unwrap_or("");
        let greeting = if first_name.is_empty() {
            format!("Budget Buddy: {random_greeting}")
        } else {
            format!("Hi, {first_name}. {random_greeting}")
        };
        Self {
            session,
            tab: Tab::Overview,
            greeting,
            today,
            goal_form: Form::new(&["Goal amount", "Target date"]),
            deals_form: Form::new(&["Occupation", "Age"]),
            opening: None,
            pending: None,
            status_message: None,
            scroll: 0,
            text_scroll: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Returns true when the dashboard should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        self.status_message = None;

        if let Some(input) = self.opening.as_mut() {
            match code {
                KeyCode::Esc => self.opening = None,
                KeyCode::Enter => {
                    let path = input.trim().to_string();
                    self.opening = None;
                    if !path.is_empty() {
                        self.pending = Some(Pending::Open(PathBuf::from(path)));
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Tab => self.set_tab(self.tab.next()),
            KeyCode::BackTab => self.set_tab(self.tab.prev()),
            KeyCode::PageDown => {
                self.text_scroll = (self.text_scroll + 5).min(self.text_scroll_limit())
            }
            KeyCode::PageUp => self.text_scroll = self.text_scroll.saturating_sub(5),
            _ if self.tab.is_form() => self.handle_form_key(code),
            _ => return self.handle_view_key(code),
        }
        false
    }

    fn handle_view_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right => self.set_tab(self.tab.next()),
            KeyCode::Left => self.set_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.set_tab(Tab::ALL[idx]);
            }
            KeyCode::Char('o') => self.opening = Some(String::new()),
            KeyCode::Char('r') => self.retry(),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = (self.scroll + 1).min(self.scroll_limit()),
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.set_tab(Tab::Overview);
                return;
            }
            KeyCode::Enter => {
                self.submit_form();
                return;
            }
            _ => {}
        }
        let form = match self.tab {
            Tab::Goal => &mut self.goal_form,
            _ => &mut self.deals_form,
        };
        match code {
            KeyCode::Down => form.focused = (form.focused + 1) % form.fields.len(),
            KeyCode::Up => {
                form.focused = if form.focused == 0 {
                    form.fields.len() - 1
                } else {
                    form.focused - 1
                };
            }
            KeyCode::Char(c) => form.fields[form.focused].value.push(c),
            KeyCode::Backspace => {
                form.fields[form.focused].value.pop();
            }
            _ => {}
        }
    }

    fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.scroll = 0;
        self.text_scroll = 0;
        if tab == Tab::Subscriptions {
            self.queue_subscription_panels();
        }
    }

    /// The subscriptions view fills both of its panels the first time it is shown.
    fn queue_subscription_panels(&mut self) {
        if self.session.data().is_none() || self.pending.is_some() {
            return;
        }
        if self.session.panel(Panel::Subscriptions) == &PanelState::NotRequested {
            self.pending = Some(Pending::Subscriptions);
        } else if self.session.panel(Panel::SubscriptionSavings) == &PanelState::NotRequested {
            self.pending = Some(Pending::SubscriptionSavings);
        }
    }

    fn retry(&mut self) {
        let panels: &[Panel] = match self.tab {
            Tab::Overview => &[Panel::Advice],
            Tab::Subscriptions => &[Panel::Subscriptions, Panel::SubscriptionSavings],
            _ => &[],
        };
        for panel in panels {
            if matches!(self.session.panel(*panel), PanelState::Failed(_)) {
                self.session.reset_panel(*panel);
            }
        }
        match self.tab {
            Tab::Overview if self.session.data().is_some() => {
                if self.session.panel(Panel::Advice) == &PanelState::NotRequested {
                    self.pending = Some(Pending::Advice);
                }
            }
            Tab::Subscriptions => self.queue_subscription_panels(),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let has_data = self.session.data().is_some();
        let result = match self.tab {
            Tab::Goal => parse_goal_form(
                self.goal_form.value(GOAL_AMOUNT_IDX),
                self.goal_form.value(GOAL_DATE_IDX),
                self.today,
            )
            .map(Pending::Goal),
            Tab::Deals => parse_deal_form(
                self.deals_form.value(DEAL_OCCUPATION_IDX),
                self.deals_form.value(DEAL_AGE_IDX),
            )
            .map(Pending::Deals),
            _ => return,
        };
        let form = if self.tab == Tab::Goal {
            &mut self.goal_form
        } else {
            &mut self.deals_form
        };
        match result {
            Err(e) => form.error = Some(e.to_string()),
            Ok(_) if !has_data => {
                form.error = Some("Open a transaction file first (o on the Overview tab).".into())
            }
            Ok(pending) => {
                form.error = None;
                self.text_scroll = 0;
                self.pending = Some(pending);
            }
        }
    }

    fn run_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let outcome = match pending {
            Pending::Open(path) => {
                self.open(&path);
                return;
            }
            Pending::Advice => self.session.general_advice().map(drop),
            Pending::Subscriptions => self.session.subscriptions().map(drop),
            Pending::SubscriptionSavings => self.session.subscription_savings().map(drop),
            Pending::Goal(goal) => self.session.analyze_goal(&goal, self.today).map(drop),
            Pending::Deals(request) => self.session.find_deals(&request).map(drop),
        };
        if let Err(e) = outcome {
            self.status_message = Some(e.to_string());
            return;
        }
        if self.tab == Tab::Subscriptions {
            self.queue_subscription_panels();
        }
    }

    fn open(&mut self, path: &Path) {
        match self.session.load_file(path) {
            Ok(data) => {
                info!(path = %path.display(), "dashboard opened file");
                self.status_message = Some(format!(
                    "Loaded {} transactions from {}",
                    data.summary.count,
                    path.display()
                ));
                self.goal_form.error = None;
                self.deals_form.error = None;
                self.set_tab(Tab::Overview);
                self.pending = Some(Pending::Advice);
            }
            Err(e) => self.status_message = Some(format!("Could not load {}: {e}", path.display())),
        }
    }

    fn scroll_limit(&self) -> usize {
        match (self.tab, self.session.data()) {
            (Tab::Overview, Some(data)) => data.summary.count.saturating_sub(1),
            (Tab::Patterns, Some(data)) => data
                .spending
                .len()
                .max(data.heatmap.categories.len())
                .saturating_sub(1),
            _ => 0,
        }
    }

    fn text_scroll_limit(&self) -> u16 {
        let panels: &[Panel] = match self.tab {
            Tab::Overview => &[Panel::Advice],
            Tab::Subscriptions => &[Panel::Subscriptions, Panel::SubscriptionSavings],
            Tab::Goal => &[Panel::Goal],
            Tab::Deals => &[Panel::Deals],
            Tab::Patterns => &[],
        };
        panels
            .iter()
            .map(|p| match self.session.panel(*p) {
                PanelState::Ready(text) => text.lines().count(),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
            .try_into()
            .unwrap_or(u16::MAX)
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, tabs_area, sep, content_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let source = self
            .session
            .data()
            .and_then(|d| d.source.file_name())
            .map(|n| format!("{} ", n.to_string_lossy()))
            .unwrap_or_default();
        let [greeting_area, source_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(source.chars().count() as u16),
        ])
        .areas(header_area);
        frame.render_widget(
            Paragraph::new(format!(" {}", self.greeting)).style(HEADER_STYLE),
            greeting_area,
        );
        frame.render_widget(Paragraph::new(source).style(FOOTER_STYLE), source_area);

        let titles: Vec<Line> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
            .collect();
        frame.render_widget(
            Tabs::new(titles)
                .select(self.tab.index())
                .style(FOOTER_STYLE)
                .highlight_style(SELECTED_STYLE.fg(Color::White)),
            tabs_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(border_style), sep);

        if let Some(input) = &self.opening {
            self.draw_open_prompt(frame, content_area, input);
        } else {
            match (self.tab, self.session.data()) {
                (Tab::Goal, _) => self.draw_form(
                    frame,
                    content_area,
                    "What are you saving for?",
                    &self.goal_form,
                    Panel::Goal,
                ),
                (Tab::Deals, _) => self.draw_form(
                    frame,
                    content_area,
                    "Tell us a little about yourself",
                    &self.deals_form,
                    Panel::Deals,
                ),
                (Tab::Overview, Some(data)) => self.draw_overview(frame, content_area, data),
                (Tab::Patterns, Some(data)) => self.draw_patterns(frame, content_area, data),
                (Tab::Subscriptions, Some(_)) => self.draw_subscriptions(frame, content_area),
                (_, None) => self.draw_welcome(frame, content_area),
            }
        }

        let hints = if self.opening.is_some() {
            " Enter=open  Esc=cancel"
        } else if self.tab.is_form() {
            " Up/Down=field  Enter=submit  PgUp/PgDn=scroll  Tab=next view  Esc=back"
        } else {
            " Tab/1-5=switch view  Up/Down=scroll  PgUp/PgDn=scroll advice  o=open  r=retry  q=quit"
        };
        let footer = if let Some(pending) = &self.pending {
            Paragraph::new(format!(" {}", pending.describe())).style(STATUS_STYLE)
        } else if let Some(msg) = &self.status_message {
            Paragraph::new(format!(" {msg}")).style(STATUS_STYLE)
        } else {
            Paragraph::new(hints).style(FOOTER_STYLE)
        };
        frame.render_widget(footer, hints_area);
    }

    fn draw_welcome(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(" No transactions loaded yet.", TITLE_STYLE)),
            Line::from(""),
            Line::from(" Press o to open a CSV file with Date, Description, Category and Amount columns."),
            Line::from(" Spending rows are negative, income rows are positive."),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_open_prompt(&self, frame: &mut Frame, area: Rect, input: &str) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(" Open a transaction file", TITLE_STYLE)),
            Line::from(""),
            Line::from(vec![
                Span::styled("   Path           ", TITLE_STYLE),
                Span::styled(format!("{input}_"), Style::default().fg(Color::Cyan)),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_overview(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let [stats_area, body_area] =
            Layout::vertical([Constraint::Length(7), Constraint::Fill(1)]).areas(area);

        let summary = &data.summary;
        let period = match (summary.first_date, summary.last_date) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "-".to_string(),
        };
        let stats_lines = vec![
            Line::from(""),
            Line::from(format!(" Transactions   {}", summary.count)),
            Line::from(format!(" Period         {period}")),
            Line::from(vec![Span::raw(" Money in       "), money_span(summary.inflows)]),
            Line::from(vec![Span::raw(" Money out      "), money_span(summary.outflows)]),
            Line::from(vec![Span::raw(" Net            "), money_span(summary.net)]),
        ];
        frame.render_widget(Paragraph::new(stats_lines), stats_area);

        let [table_area, advice_area] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(body_area);

        let rows: Vec<Row> = self
            .session
            .ledger()
            .map(|l| l.transactions.as_slice())
            .unwrap_or_default()
            .iter()
            .skip(self.scroll)
            .map(|t| {
                Row::new(vec![
                    Cell::from(t.date.to_string()),
                    Cell::from(t.description.clone()),
                    Cell::from(t.category.clone()),
                    Cell::from(Line::from(money_span(t.amount)).alignment(Alignment::Right)),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(14),
                Constraint::Length(12),
            ],
        )
        .header(Row::new(vec!["Date", "Description", "Category", "Amount"]).style(FOOTER_STYLE))
        .block(titled(" Transactions"));
        frame.render_widget(table, table_area);

        self.draw_panel(
            frame,
            advice_area,
            " AI Financial Advice",
            Panel::Advice,
            "Advice appears here once a file is loaded. Press r to ask again.",
        );
    }

    fn draw_patterns(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let [breakdown_area, heatmap_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);

        let name_width = data
            .spending
            .iter()
            .map(|s| s.category.chars().count())
            .max()
            .unwrap_or(10);
        let mut lines = vec![Line::from(Span::styled(" Spending Breakdown", TITLE_STYLE))];
        if data.spending.is_empty() {
            lines.push(Line::from(Span::styled(" No spending in this file.", FOOTER_STYLE)));
        }
        for share in data.spending.iter().skip(self.scroll) {
            lines.push(Line::from(vec![
                Span::raw(format!(" {:<width$} ", share.category, width = name_width)),
                Span::styled(bar(share.pct / 100.0, BAR_WIDTH), Style::default().fg(Color::Red)),
                Span::raw(format!(" {:>5.1}%  ", share.pct)),
                money_span(-share.total),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), breakdown_area);

        let grid = &data.heatmap;
        let label_width = grid
            .categories
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(8) as u16;
        let mut header = vec![Cell::from("")];
        header.extend(WEEKDAYS.iter().map(|d| Cell::from(weekday_label(*d))));
        let rows: Vec<Row> = grid
            .categories
            .iter()
            .enumerate()
            .skip(self.scroll)
            .map(|(row, category)| {
                let mut cells = vec![Cell::from(category.clone())];
                cells.extend((0..WEEKDAYS.len()).map(|col| {
                    let value = grid.cells[row][col];
                    let label = if value > 0.0 { compact_money(value) } else { String::new() };
                    Cell::from(label).style(
                        Style::default()
                            .bg(heat_color(grid.intensity(row, col)))
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    )
                }));
                Row::new(cells)
            })
            .collect();
        let mut widths = vec![Constraint::Length(label_width + 1)];
        widths.extend([Constraint::Length(7); 7]);
        let table = Table::new(rows, widths)
            .header(Row::new(header).style(FOOTER_STYLE))
            .column_spacing(0)
            .block(titled(" Spending by Day of Week"));
        frame.render_widget(table, heatmap_area);
    }

    fn draw_subscriptions(&self, frame: &mut Frame, area: Rect) {
        let [list_area, savings_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);
        self.draw_panel(
            frame,
            list_area,
            " Subscriptions",
            Panel::Subscriptions,
            "Recurring charges will be listed here.",
        );
        self.draw_panel(
            frame,
            savings_area,
            " Potential Savings",
            Panel::SubscriptionSavings,
            "Savings from cancelling subscriptions will appear here.",
        );
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &Form, panel: Panel) {
        let form_height = form.fields.len() as u16 + 5;
        let [form_area, result_area] =
            Layout::vertical([Constraint::Length(form_height), Constraint::Fill(1)]).areas(area);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(format!(" {title}"), TITLE_STYLE)),
            Line::from(""),
        ];
        for (i, field) in form.fields.iter().enumerate() {
            let is_focused = i == form.focused;
            let label_style = if is_focused { TITLE_STYLE } else { Style::default() };
            let cursor = if is_focused { "_" } else { "" };
            lines.push(Line::from(vec![
                Span::styled(format!("   {:<14} ", field.label), label_style),
                Span::styled(
                    format!("{}{cursor}", field.value),
                    if is_focused {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    },
                ),
            ]));
        }
        if let Some(err) = &form.error {
            lines.push(Line::from(Span::styled(format!("   {err}"), STATUS_STYLE)));
        }
        frame.render_widget(Paragraph::new(lines), form_area);

        self.draw_panel(
            frame,
            result_area,
            "",
            panel,
            "Fill in the form and press Enter.",
        );
    }

    fn draw_panel(&self, frame: &mut Frame, area: Rect, title: &str, panel: Panel, placeholder: &str) {
        let state = self.session.panel(panel);
        let more_below = match state {
            PanelState::Ready(text) => {
                let (_, lines) = wrap_text(text, area.width as usize);
                lines.saturating_sub(self.text_scroll) > area.height.saturating_sub(1)
            }
            _ => false,
        };
        let title = if more_below {
            format!("{title}  (PgDn for more)")
        } else {
            title.to_string()
        };
        let body = Paragraph::new(panel_text(state, placeholder))
            .wrap(Wrap { trim: false })
            .scroll((self.text_scroll, 0))
            .block(titled(&title));
        frame.render_widget(body, area);
    }
}

fn titled(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(TITLE_STYLE)
        .borders(Borders::NONE)
}

/// Open the dashboard, optionally with a file already loaded.
pub fn run(file: Option<&Path>, model: Option<&str>) -> anyhow::Result<()> {
    let client = connect(model)?;
    let settings = load_settings();
    let mut dashboard = Dashboard::new(Session::new(client), &settings.user_name, today());
    info!(model = dashboard.session.advisor().model(), "dashboard started");
    if let Some(path) = file {
        dashboard
            .session
            .load_file(path)
            .with_context(|| format!("Could not load {}", path.display()))?;
        dashboard.pending = Some(Pending::Advice);
    }

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();
    let result = dashboard.event_loop(&mut terminal);
    drop(terminal);
    ratatui::restore();
    result
}

impl<A: Advisor> Dashboard<A> {
    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if self.pending.is_some() {
                self.run_pending();
                continue;
            }

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    return Ok(());
                }
                if self.handle_key(key.code) {
                    return Ok(());
                }
            }
        }
    }
}

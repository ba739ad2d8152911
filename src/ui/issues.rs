use chrono::Utc;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use super::truncate;
use crate::browser::{BrowserState, Content, Loaded};
use crate::types::{IssueFilter, IssueState};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(frame: &mut Frame, state: &BrowserState, spinner: usize, area: Rect) {
    match &state.content {
        Content::Loading => render_loading(frame, spinner, area),
        Content::Failed(error) => render_failed(frame, state, error, area),
        Content::Ready(loaded) => render_ready(frame, state, loaded, spinner, area),
    }
}

fn render_loading(frame: &mut Frame, spinner: usize, area: Rect) {
    let text = format!("{} Carregando", SPINNER[spinner % SPINNER.len()]);
    let loading = Paragraph::new(vec![Line::from(""), Line::from(text)])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(loading, area);
}

fn render_failed(frame: &mut Frame, state: &BrowserState, error: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Could not load {}", state.repository_ref),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "r: retry | q: back to repositories",
            Style::default().fg(Color::Gray),
        )),
    ];
    let failed = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        );
    frame.render_widget(failed, area);
}

fn render_ready(
    frame: &mut Frame,
    state: &BrowserState,
    loaded: &Loaded,
    spinner: usize,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    render_owner(frame, loaded, chunks[0]);
    render_filters(frame, state.filter, chunks[1]);
    render_issue_list(frame, state, loaded, spinner, chunks[2]);
    render_pagination(frame, state, loaded, chunks[3]);
}

fn render_owner(frame: &mut Frame, loaded: &Loaded, area: Rect) {
    let repo = &loaded.repository;
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("@{}", repo.owner.login),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(" / "),
            Span::styled(
                repo.name.as_str(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::raw(repo.description.as_deref().unwrap_or(""))),
    ];

    let owner = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" q: back to repositories "),
    );
    frame.render_widget(owner, area);
}

fn filter_color(filter: IssueFilter) -> Color {
    match filter.color_hint() {
        "green" => Color::Green,
        "red" => Color::Red,
        _ => Color::Blue,
    }
}

fn render_filters(frame: &mut Frame, active: IssueFilter, area: Rect) {
    let titles: Vec<Line> = IssueFilter::ALL
        .iter()
        .map(|f| Line::from(format!("[{}] {}", f.index() + 1, f.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Filter "))
        .select(active.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(filter_color(active))
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_issue_list(
    frame: &mut Frame,
    state: &BrowserState,
    loaded: &Loaded,
    spinner: usize,
    area: Rect,
) {
    let title = if loaded.refreshing {
        format!(" Issues {} ", SPINNER[spinner % SPINNER.len()])
    } else {
        format!(" Issues ({}) ", loaded.issues.len())
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if let Some(error) = &loaded.issues_error {
        let failed = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Failed to load issues: {}", error),
                Style::default().fg(Color::Red),
            )),
            Line::from(Span::styled(
                "r: retry",
                Style::default().fg(Color::Gray),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(block.border_style(Style::default().fg(Color::Red)));
        frame.render_widget(failed, area);
        return;
    }

    if loaded.issues.is_empty() {
        let empty = Paragraph::new("No issues")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 42; // #num(7) + labels(18) + @author(16) + spaces
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = loaded
        .issues
        .iter()
        .enumerate()
        .map(|(i, issue)| {
            let style = if i == state.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let state_color = match issue.state {
                IssueState::Open => Color::Green,
                IssueState::Closed => Color::Red,
            };

            let labels = issue
                .labels
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let mut spans = vec![
                Span::styled(
                    format!("#{:<6}", issue.number),
                    Style::default().fg(state_color),
                ),
                Span::styled(format!("{:<flex$}", truncate(&issue.title, flex)), style),
                Span::raw(" "),
                Span::styled(
                    format!("{:<18}", truncate(&labels, 18)),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("@{}", truncate(&issue.user.login, 15)),
                    Style::default().fg(Color::Gray),
                ),
            ];
            if let Some(created_at) = issue.created_at {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format_age(created_at),
                    Style::default().fg(Color::DarkGray),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_pagination(frame: &mut Frame, state: &BrowserState, loaded: &Loaded, area: Rect) {
    let back = if state.can_go_back() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    };

    let mut spans = vec![
        Span::styled("< Back [p]", back),
        Span::raw("   "),
        Span::styled(
            format!("Page {}", state.page),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("[n] Next >", Style::default().fg(Color::Cyan)),
    ];
    if loaded.exhausted {
        spans.push(Span::styled(
            "  (last page)",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let pagination = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(pagination, area);
}

fn format_age(dt: chrono::DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::HomeState;

pub fn render(frame: &mut Frame, home: &HomeState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_input(frame, home, chunks[0]);
    render_repositories(frame, home, chunks[1]);
}

fn render_input(frame: &mut Frame, home: &HomeState, area: Rect) {
    let border = if home.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let (shown, style) = if home.input.is_empty() && !home.editing {
        ("Add repository", Style::default().fg(Color::DarkGray))
    } else {
        (home.input.as_str(), Style::default())
    };

    let submit_width = 6u16;
    let inner_width = area.width.saturating_sub(2 + submit_width) as usize;
    let line = Line::from(vec![
        Span::styled(shown, style),
        Span::raw(" ".repeat(inner_width.saturating_sub(shown.chars().count()))),
        // Submit control; submitting does nothing yet.
        Span::styled(" [+] ", Style::default().fg(Color::DarkGray)),
    ]);

    let input = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(
                " Repositories ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(input, area);

    if home.editing {
        frame.set_cursor_position(cursor_position(home, area));
    }
}

/// Cursor after the typed text, clamped inside the input box.
fn cursor_position(home: &HomeState, area: Rect) -> (u16, u16) {
    let typed = u16::try_from(home.input.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    (x.min(area.right().saturating_sub(2)), area.y.saturating_add(1))
}

fn render_repositories(frame: &mut Frame, home: &HomeState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Browse ({}) ", home.repositories.len()));

    if home.repositories.is_empty() {
        let empty = Paragraph::new("No repositories configured")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = home
        .repositories
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let style = if i == home.index && !home.editing {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(repo.to_string(), style)))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(home.index));

    frame.render_stateful_widget(list, area, &mut state);
}

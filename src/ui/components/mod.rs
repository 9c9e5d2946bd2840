pub mod status_bar;
pub mod todo_tab;
pub mod upload_tab;

use crate::app::mode::{Mode, Tab};
use crate::app::AppState;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

pub fn render(f: &mut Frame, state: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(1),    // Active tab
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_tabs(f, state, chunks[0]);

    match state.tab {
        Tab::Todos => todo_tab::render(f, state, chunks[1]),
        Tab::Upload => upload_tab::render(f, state, chunks[1]),
    }

    status_bar::render(f, state, chunks[2]);

    if state.mode == Mode::TodoPrompt {
        render_todo_prompt(f, state);
    }
}

fn render_tabs(f: &mut Frame, state: &AppState, area: Rect) {
    let titles = Tab::ALL.iter().enumerate().map(|(i, tab)| {
        Line::from(format!(" {} {} ", i + 1, tab.title()))
    });

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cloudtodo ")
                .style(Style::default().bg(state.theme.background)),
        )
        .style(Style::default().fg(state.theme.foreground))
        .highlight_style(
            Style::default()
                .fg(state.theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .select(state.tab.index());

    f.render_widget(tabs, area);
}

fn render_todo_prompt(f: &mut Frame, state: &AppState) {
    let area = centered_rect(60, 30, f.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" New todo ")
        .style(Style::default().bg(state.theme.background));
    let inner = block.inner(area);

    let lines = vec![
        Line::from(Span::styled(
            state.input.text().to_string(),
            Style::default().fg(state.theme.foreground),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(state.theme.accent).add_modifier(Modifier::BOLD)),
            Span::raw(" Create  "),
            Span::styled("[Esc]", Style::default().fg(state.theme.accent).add_modifier(Modifier::BOLD)),
            Span::raw(" Cancel"),
        ]),
    ];

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
    set_input_cursor(f, state, inner);
}

/// Places the terminal cursor at the input buffer's cursor inside `area`.
pub(crate) fn set_input_cursor(f: &mut Frame, state: &AppState, area: Rect) {
    let column = u16::try_from(state.input.cursor_column()).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(column)
        .min(area.right().saturating_sub(1));
    f.set_cursor_position((x, area.y));
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

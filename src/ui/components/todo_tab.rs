use crate::app::AppState;
use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, state: &mut AppState, area: Rect) {
    let title = format!(" Todos ({}) ", state.items().len());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(state.theme.background));

    if state.items().is_empty() {
        let hint = if state.todo_view.snapshots_seen() == 0 {
            "  Loading..."
        } else {
            "  No todos yet. Press n to add one."
        };
        let empty = Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(state.theme.muted),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    state.list_state.select(Some(state.cursor_position));

    let theme = &state.theme;
    let items: Vec<ListItem> = state
        .todo_view
        .items()
        .iter()
        .map(|item| {
            let created = item.created_at.with_timezone(&Local).format("%H:%M");
            let content_style = if item.content.is_some() {
                Style::default().fg(theme.foreground)
            } else {
                Style::default()
                    .fg(theme.muted)
                    .add_modifier(Modifier::ITALIC)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {created}  "), Style::default().fg(theme.muted)),
                Span::styled(item.display_content(), content_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(list, area, &mut state.list_state);
}

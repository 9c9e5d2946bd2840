use crate::app::AppState;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn render(f: &mut Frame, state: &AppState, area: Rect) {
    if let Some((message, time)) = &state.status_message
        && time.elapsed().as_secs() <= 3
    {
        render_status_message(f, state, message, area);
        return;
    }

    let connection = if state.todo_view.is_disconnected() {
        " [disconnected]"
    } else {
        ""
    };
    let pending = if state.pending_creates > 0 {
        format!(" [{} saving]", state.pending_creates)
    } else {
        String::new()
    };

    let left_content = format!(
        " {} | {} | {} items{}{}",
        state.mode,
        state.backend.describe(),
        state.items().len(),
        pending,
        connection
    );

    let nav_hint = "tab switch  q quit";
    let version_text = format!("v{VERSION}");

    let padding = area.width.saturating_sub(
        left_content.len() as u16 + nav_hint.len() as u16 + version_text.len() as u16 + 3,
    );

    let base_style = Style::default()
        .fg(state.theme.status_bar_fg)
        .bg(state.theme.status_bar_bg);

    let style = if state.todo_view.is_disconnected() {
        base_style.add_modifier(Modifier::BOLD)
    } else {
        base_style
    };

    let status_line = format!(
        "{} {} {:>padding$}{} ",
        left_content,
        nav_hint,
        "",
        version_text,
        padding = padding as usize
    );

    f.render_widget(Paragraph::new(Line::from(Span::styled(status_line, style))), area);
}

fn render_status_message(f: &mut Frame, state: &AppState, message: &str, area: Rect) {
    let display_message = format!(" {message} ");

    let bg = if message.starts_with("Could not") || message.starts_with("Upload failed") {
        state.theme.error
    } else {
        ratatui::style::Color::Rgb(0, 100, 0)
    };
    let style = Style::default()
        .fg(ratatui::style::Color::White)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let padding = area.width.saturating_sub(display_message.len() as u16);
    let status_line = format!(
        "{}{:padding$}",
        display_message,
        "",
        padding = padding as usize
    );

    f.render_widget(Paragraph::new(Line::from(Span::styled(status_line, style))), area);
}

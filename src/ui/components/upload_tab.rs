use super::set_input_cursor;
use crate::app::mode::Mode;
use crate::app::AppState;
use cloud_todo::utils::format::{format_bytes, format_transfer};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", state.upload.title()))
        .style(Style::default().bg(state.theme.background));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // File
            Constraint::Length(2), // Path input or prefix
            Constraint::Length(2), // Progress
            Constraint::Min(1),    // Outcome
            Constraint::Length(1), // Keys
        ])
        .split(inner);

    render_file_line(f, state, rows[0]);
    render_path_line(f, state, rows[1]);

    if state.upload.is_uploading() {
        render_progress(f, state, rows[2]);
    }

    render_outcome(f, state, rows[3]);
    render_keys(f, state, rows[4]);
}

fn render_file_line(f: &mut Frame, state: &AppState, area: Rect) {
    let line = match &state.upload.state().selected_file {
        Some(file) => Line::from(vec![
            Span::raw("  File: "),
            Span::styled(
                file.name.clone(),
                Style::default()
                    .fg(state.theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({})", format_bytes(file.size())),
                Style::default().fg(state.theme.muted),
            ),
        ]),
        None => Line::from(Span::styled(
            "  No file selected",
            Style::default().fg(state.theme.muted),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_path_line(f: &mut Frame, state: &AppState, area: Rect) {
    if state.mode == Mode::FilePath {
        let label = "  Path: ";
        let line = Line::from(vec![
            Span::styled(label, Style::default().fg(state.theme.accent)),
            Span::raw(state.input.text().to_string()),
        ]);
        f.render_widget(Paragraph::new(line), area);

        let input_area = Rect {
            x: area.x + label.len() as u16,
            width: area.width.saturating_sub(label.len() as u16),
            ..area
        };
        set_input_cursor(f, state, input_area);
        return;
    }

    let line = Line::from(Span::styled(
        format!("  Key prefix: {}", state.upload.key_prefix()),
        Style::default().fg(state.theme.muted),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn render_progress(f: &mut Frame, state: &AppState, area: Rect) {
    let gauge_area = Rect {
        x: area.x + 2,
        width: area.width.saturating_sub(4),
        height: 1,
        ..area
    };

    let upload = state.upload.state();
    let label = match upload.transferred {
        Some(progress) => format!(
            "{}% ({})",
            upload.progress_percent,
            format_transfer(progress.loaded, progress.total)
        ),
        None => format!("{}%", upload.progress_percent),
    };

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(state.theme.gauge).bg(state.theme.muted))
        .percent(u16::from(upload.progress_percent))
        .label(label);

    f.render_widget(gauge, gauge_area);
}

fn render_outcome(f: &mut Frame, state: &AppState, area: Rect) {
    let upload = state.upload.state();

    let line = if let Some(error) = &upload.error_message {
        Line::from(Span::styled(
            format!("  {error}"),
            Style::default()
                .fg(state.theme.error)
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(key) = &upload.completed_key {
        Line::from(vec![
            Span::styled("  Uploaded: ", Style::default().fg(state.theme.success)),
            Span::styled(
                key.clone(),
                Style::default()
                    .fg(state.theme.success)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        return;
    };

    f.render_widget(Paragraph::new(line).wrap(Wrap { trim: false }), area);
}

fn render_keys(f: &mut Frame, state: &AppState, area: Rect) {
    let key_style = Style::default()
        .fg(state.theme.accent)
        .add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(state.theme.muted);

    let spans = match state.mode {
        Mode::FilePath => vec![
            Span::styled("  [Enter]", key_style),
            Span::raw(" Select  "),
            Span::styled("[Esc]", key_style),
            Span::raw(" Cancel"),
        ],
        _ if state.upload.is_uploading() => vec![
            Span::styled("  [f] Choose file  [u] Upload  (uploading...)", disabled),
        ],
        _ => {
            let upload_style = if state.upload.state().can_submit() {
                key_style
            } else {
                disabled
            };
            vec![
                Span::styled("  [f]", key_style),
                Span::raw(" Choose file  "),
                Span::styled("[u]", upload_style),
                Span::raw(" Upload"),
            ]
        }
    };

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

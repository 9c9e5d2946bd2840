use super::mode::{Mode, Tab};
use super::state::AppState;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.should_quit = true;
        return Ok(());
    }

    if state.mode.is_editing() {
        handle_input_mode(key, state);
    } else {
        handle_navigate_mode(key, state);
    }
    Ok(())
}

fn handle_navigate_mode(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Tab | KeyCode::BackTab => state.switch_tab(state.tab.next()),
        KeyCode::Char('1') => state.switch_tab(Tab::Todos),
        KeyCode::Char('2') => state.switch_tab(Tab::Upload),
        _ => match state.tab {
            Tab::Todos => handle_todos_tab(key, state),
            Tab::Upload => handle_upload_tab(key, state),
        },
    }
}

fn handle_todos_tab(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.move_cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => state.move_cursor_up(),
        KeyCode::Char('n') | KeyCode::Char('a') => state.open_todo_prompt(),
        _ => {}
    }
}

fn handle_upload_tab(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('f') => state.open_file_prompt(),
        KeyCode::Char('u') | KeyCode::Enter => state.submit_upload(),
        _ => {}
    }
}

fn handle_input_mode(key: KeyEvent, state: &mut AppState) {
    let word = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => cancel_input(state),
        KeyCode::Enter => confirm_input(state),
        KeyCode::Backspace => state.input.backspace(),
        KeyCode::Delete => state.input.delete(),
        KeyCode::Left if word => state.input.move_word_left(),
        KeyCode::Right if word => state.input.move_word_right(),
        KeyCode::Left => state.input.move_left(),
        KeyCode::Right => state.input.move_right(),
        KeyCode::Home => state.input.home(),
        KeyCode::End => state.input.end(),
        KeyCode::Char(c) => state.input.insert(c),
        _ => {}
    }
}

fn cancel_input(state: &mut AppState) {
    let mode = std::mem::take(&mut state.mode);
    state.input.clear();
    // A dismissed prompt still issues the create, with no content.
    if mode == Mode::TodoPrompt {
        state.submit_todo(None);
    }
}

fn confirm_input(state: &mut AppState) {
    let mode = std::mem::take(&mut state.mode);
    let text = state.input.take();
    match mode {
        Mode::TodoPrompt => state.submit_todo(Some(text)),
        Mode::FilePath => {
            let path = text.trim();
            if !path.is_empty() {
                state.select_file_path(&PathBuf::from(path));
            }
        }
        Mode::Navigate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::{offline_state, tick_until};
    use cloud_todo::upload::UploadPhase;
    use pretty_assertions::assert_eq;

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), state).unwrap();
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_prompt_enter_creates_todo() {
        let (_runtime, mut state) = offline_state();

        press(&mut state, KeyCode::Char('n'));
        assert_eq!(state.mode, Mode::TodoPrompt);
        type_text(&mut state, "Buy milk");
        press(&mut state, KeyCode::Enter);

        assert_eq!(state.mode, Mode::Navigate);
        assert!(state.input.is_empty());
        tick_until(&mut state, |s| s.items().len() == 1);
        assert_eq!(state.items()[0].content.as_deref(), Some("Buy milk"));
    }

    #[test]
    fn test_prompt_escape_creates_empty_todo() {
        let (_runtime, mut state) = offline_state();

        press(&mut state, KeyCode::Char('n'));
        type_text(&mut state, "never mind");
        press(&mut state, KeyCode::Esc);

        tick_until(&mut state, |s| s.items().len() == 1);
        assert_eq!(state.items()[0].content, None);
    }

    #[test]
    fn test_typing_q_in_prompt_does_not_quit() {
        let (_runtime, mut state) = offline_state();

        press(&mut state, KeyCode::Char('n'));
        press(&mut state, KeyCode::Char('q'));

        assert!(!state.should_quit);
        assert_eq!(state.input.text(), "q");
    }

    #[test]
    fn test_tab_switches_and_q_quits() {
        let (_runtime, mut state) = offline_state();

        press(&mut state, KeyCode::Tab);
        assert_eq!(state.tab, Tab::Upload);
        press(&mut state, KeyCode::Char('1'));
        assert_eq!(state.tab, Tab::Todos);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn test_upload_without_file_shows_message() {
        let (_runtime, mut state) = offline_state();

        press(&mut state, KeyCode::Char('2'));
        press(&mut state, KeyCode::Char('u'));

        assert_eq!(
            state.upload.state().error_message.as_deref(),
            Some("Please select a file first")
        );
        assert_eq!(state.upload.phase(), UploadPhase::Idle);
    }

    #[test]
    fn test_file_prompt_selects_then_uploads() {
        let (_runtime, mut state) = offline_state();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        press(&mut state, KeyCode::Char('2'));
        press(&mut state, KeyCode::Char('f'));
        assert_eq!(state.mode, Mode::FilePath);
        type_text(&mut state, &path.display().to_string());
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.upload.phase(), UploadPhase::Ready);

        press(&mut state, KeyCode::Enter);
        tick_until(&mut state, |s| s.upload.phase() == UploadPhase::Succeeded);

        let key = state.upload.state().completed_key.clone().unwrap();
        assert!(key.ends_with("-report.pdf"));
    }
}

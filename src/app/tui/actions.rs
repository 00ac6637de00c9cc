use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

use crate::engine::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum ListAction {
    Quit,
    Previous,
    Next,
    Open,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum ViewerAction {
    Input(InputEvent),
    Quit,
    None,
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

pub(super) fn list_action(key: &KeyEvent) -> ListAction {
    if is_ctrl_c(key) {
        return ListAction::Quit;
    }
    match key.code {
        KeyCode::Char('q') => ListAction::Quit,
        KeyCode::Left | KeyCode::Char('h') => ListAction::Previous,
        KeyCode::Right | KeyCode::Char('l') => ListAction::Next,
        KeyCode::Enter | KeyCode::Char(' ') => ListAction::Open,
        _ => ListAction::None,
    }
}

/// `p` flips pause against the engine's current state.
pub(super) fn viewer_action(key: &KeyEvent, paused: bool) -> ViewerAction {
    if is_ctrl_c(key) {
        return ViewerAction::Quit;
    }
    match key.code {
        KeyCode::Left => ViewerAction::Input(InputEvent::KeyLeft),
        KeyCode::Right => ViewerAction::Input(InputEvent::KeyRight),
        KeyCode::Char(' ') => ViewerAction::Input(InputEvent::KeySpace),
        KeyCode::Esc => ViewerAction::Input(InputEvent::KeyEscape),
        KeyCode::Char('p') if paused => ViewerAction::Input(InputEvent::Resume),
        KeyCode::Char('p') => ViewerAction::Input(InputEvent::Pause),
        KeyCode::Char('q') => ViewerAction::Quit,
        _ => ViewerAction::None,
    }
}

/// Horizontal position of a click within the story surface as a fraction of
/// its width, or `None` when the click landed outside it.
pub(super) fn tap_fraction(column: u16, row: u16, area: Rect) -> Option<f64> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    let inside_x = column >= area.x && column < area.x + area.width;
    let inside_y = row >= area.y && row < area.y + area.height;
    if !inside_x || !inside_y {
        return None;
    }
    let offset = f64::from(column - area.x) + 0.5;
    Some(offset / f64::from(area.width))
}

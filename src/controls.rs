use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::Phase;

/// Discrete user actions the trainer understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Select(usize),
    SelectPrev,
    SelectNext,
    Submit,
    Next,
    /// shift the window by this many scroll steps
    Scroll(f64),
    ToggleGuide,
    Quit,
}

/// Maps a key press to a command for the current phase.
pub fn command_for(key: KeyEvent, phase: Phase, guide_open: bool) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Esc => return Some(Command::Quit),
        KeyCode::Char('g') => return Some(Command::ToggleGuide),
        _ => {}
    }
    if guide_open {
        return match key.code {
            KeyCode::Char('b') | KeyCode::Backspace => Some(Command::ToggleGuide),
            _ => None,
        };
    }

    match phase {
        Phase::AwaitingAnswer => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Command::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::SelectNext),
            KeyCode::Char(c @ '1'..='9') => Some(Command::Select(c as usize - '1' as usize)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Submit),
            KeyCode::Left | KeyCode::Char('h') => Some(Command::Scroll(-1.0)),
            KeyCode::Right | KeyCode::Char('l') => Some(Command::Scroll(1.0)),
            _ => None,
        },
        Phase::AnswerRevealed => match key.code {
            KeyCode::Char('n') | KeyCode::Enter | KeyCode::Right => Some(Command::Next),
            _ => None,
        },
    }
}

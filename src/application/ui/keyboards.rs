use super::callbacks;
use crate::domain::traits::{Keyboard, KeyboardButton};

fn help_row() -> Vec<KeyboardButton> {
    vec![
        KeyboardButton::new("How to export a chat").with_callback(callbacks::EXPORT_HELP),
        KeyboardButton::new("FAQ").with_callback(callbacks::FAQ),
    ]
}

pub fn start_menu() -> Keyboard {
    vec![help_row()]
}

/// Shown once at least one file is staged
pub fn ready_menu() -> Keyboard {
    vec![
        help_row(),
        vec![KeyboardButton::new("Start processing").with_callback(callbacks::START_PROCESS)],
    ]
}

pub fn process_other_menu() -> Keyboard {
    vec![vec![KeyboardButton::new("Process another chat").with_callback(callbacks::PROCESS_OTHER)]]
}

pub fn restart_menu() -> Keyboard {
    vec![vec![KeyboardButton::new("Start over").with_callback(callbacks::RESTART)]]
}

//! Views over the console view models.
//!
//! `tui` holds ratatui widgets for the interactive console; `text` holds
//! `fmt::Display` wrappers for the one-shot subcommands. Neither computes
//! anything: presenters decide what is shown, views decide how.

pub mod text;
pub mod tui;

pub use text::{PanelText, TreeText};
pub use tui::{ComparisonView, MenuView, PanelView, ScreenView, StatusBarView};

use crate::presentation::view_models::StatusLevel;
use ratatui::style::Color;

pub(crate) fn status_level_to_color(level: StatusLevel) -> Color {
    match level {
        StatusLevel::Success => Color::Green,
        StatusLevel::Info => Color::Cyan,
        StatusLevel::Warning => Color::Yellow,
        StatusLevel::Error => Color::Red,
    }
}

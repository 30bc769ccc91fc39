pub mod tui;

pub use tui::{TuiRenderer, map_key};

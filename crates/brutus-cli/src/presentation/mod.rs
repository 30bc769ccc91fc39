//! # Presentation Layer
//!
//! MVVM split, one direction only:
//!
//! ```text
//! [ ConsoleState ] --> [ Presenter ] --> [ ViewModel ] --> [ View ] --> terminal
//!                     (pure fn)         (Serialize)      (Widget / Display)
//! ```
//!
//! * `view_models`: plain data, no logic beyond sizing.
//! * `presenters`: decide what each screen shows.
//! * `views`: ratatui widgets and `fmt::Display` wrappers; styling only.
//! * `renderers`: the terminal loop that ties input, state and views together.

pub mod presenters;
pub mod renderers;
pub mod view_models;
pub mod views;

pub use renderers::TuiRenderer;
pub use view_models::{ScreenViewModel, StatusLevel};

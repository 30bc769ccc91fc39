mod args;
mod commands;
mod handlers;

pub mod config;
pub mod console;
pub mod logging;
pub mod presentation;

pub use args::{Cli, Commands, LogLevel, TemplateArg};
pub use commands::run;

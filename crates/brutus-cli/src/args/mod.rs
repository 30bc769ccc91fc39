mod commands;
mod enums;

pub use commands::*;
pub use enums::*;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "brutus")]
#[command(about = "Bootstrap and validate Azure CAF management-group hierarchies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to $BRUTUS_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level written to the log file (overrides RUST_LOG and the config file)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

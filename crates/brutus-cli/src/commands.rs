use super::args::{Cli, Commands};
use super::handlers;
use crate::config::Config;
use crate::logging;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    // Logging is best effort; a read-only log dir must not block the console
    let _guard = match logging::init(cli.log_level, &config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    let command = cli.command.unwrap_or(Commands::Console { demo: false });
    tracing::debug!(command = command.name(), "dispatching command");

    match command {
        Commands::Console { demo } => handlers::console::handle(&config, demo),
        Commands::Template {
            template,
            subscription,
        } => handlers::template::handle(template.into(), subscription),
        Commands::Compare {
            template,
            demo,
            width,
        } => handlers::compare::handle(&config, template.into(), demo, width),
        Commands::Status { demo } => handlers::status::handle(&config, demo),
    }
}

use std::sync::mpsc;

use anyhow::{Result, bail};
use is_terminal::IsTerminal;

use crate::config::Config;
use crate::console::{Console, TokioDispatcher};
use crate::presentation::TuiRenderer;

pub fn handle(config: &Config, demo: bool) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        bail!("the interactive console needs a terminal; try `brutus status` or `brutus compare`");
    }

    let runtime = super::runtime()?;
    let evaluator = super::evaluator(config, demo)?;

    let (tx, rx) = mpsc::channel();
    let dispatcher = TokioDispatcher::new(
        runtime.handle().clone(),
        evaluator,
        config.prefer_discovered_hierarchy,
        tx,
    );
    let mut console = Console::new(dispatcher);

    tracing::info!(demo, "console opened");
    let result = TuiRenderer::new(config.tick_rate(), config.confirmation_preview_lines)
        .run(&mut console, rx);
    tracing::info!(pending = console.pending().len(), "console closed");

    // In-flight tasks are abandoned; their outcomes have nowhere to go
    runtime.shutdown_background();
    result
}

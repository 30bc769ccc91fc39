pub mod compare;
pub mod console;
pub mod status;
pub mod template;

use anyhow::{Context, Result};
use brutus_azure::{DemoTenant, Evaluator};
use is_terminal::IsTerminal;

use crate::config::Config;

/// The demo tenant, or live Azure built from the configured endpoints
pub(crate) fn evaluator(config: &Config, demo: bool) -> Result<Evaluator> {
    if demo {
        tracing::info!("using demo tenant");
        return Ok(DemoTenant::contoso().into_evaluator());
    }
    Evaluator::live(&config.azure_settings()).context("failed to prepare the Azure client")
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
}

pub(crate) fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

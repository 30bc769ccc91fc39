use anyhow::{Context, Result};
use brutus_azure::{Evaluator, HierarchyReport, load_hierarchy};
use brutus_engine::{generate, render_side_by_side};
use brutus_types::{HierarchySource, StructureTemplate, SubscriptionInfo, SubscriptionInventory};
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::config::Config;

const DEFAULT_WIDTH: usize = 120;
const MIN_COLUMN_WIDTH: usize = 20;

pub fn handle(
    config: &Config,
    template: StructureTemplate,
    demo: bool,
    width: Option<usize>,
) -> Result<()> {
    let evaluator = super::evaluator(config, demo)?;
    let runtime = super::runtime()?;
    let (report, default) =
        runtime.block_on(current_hierarchy(&evaluator, config.prefer_discovered_hierarchy))?;

    let width = width
        .or_else(|| terminal_size().map(|(Width(w), _)| usize::from(w)))
        .unwrap_or(DEFAULT_WIDTH);
    let lines = comparison_lines(&report, template, default.as_ref(), width);

    let colored = super::use_color();
    let heading = format!("{} - {}", template.label(), template.description());
    if colored {
        println!("{}", heading.bold());
    } else {
        println!("{}", heading);
    }
    println!("{}", report.access.status);
    if report.source == HierarchySource::Mock {
        if colored {
            println!("{}", "📋 Mock CAF Structure (Demo)".yellow().italic());
        } else {
            println!("📋 Mock CAF Structure (Demo)");
        }
    }
    println!();
    for line in lines {
        println!("{}", line.trim_end());
    }
    Ok(())
}

/// Sign in if possible and load the hierarchy; without a session the mock is used
async fn current_hierarchy(
    evaluator: &Evaluator,
    prefer_discovered: bool,
) -> Result<(HierarchyReport, Option<SubscriptionInfo>)> {
    let session = match evaluator.authenticate().await {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "sign-in failed, comparing against the mock structure");
            eprintln!("⚠️  Not signed in ({}); showing the mock structure", e);
            None
        }
    };

    let default = match &session {
        Some(session) => match evaluator.list_subscriptions(session).await {
            Ok(subscriptions) => SubscriptionInventory::from_list(subscriptions).default,
            Err(e) => {
                tracing::warn!(error = %e, "subscription listing failed");
                None
            }
        },
        None => None,
    };

    let report = load_hierarchy(evaluator, session.as_ref(), default.as_ref(), prefer_discovered)
        .await
        .context("failed to load the management group hierarchy")?;
    Ok((report, default))
}

/// Side-by-side rows fitted to `width` terminal cells
pub fn comparison_lines(
    report: &HierarchyReport,
    template: StructureTemplate,
    default: Option<&SubscriptionInfo>,
    width: usize,
) -> Vec<String> {
    let column_width = (width.saturating_sub(2) / 2).max(MIN_COLUMN_WIDTH);
    let recommended = generate(template, default);
    render_side_by_side(Some(&report.tree), Some(&recommended), column_width)
}

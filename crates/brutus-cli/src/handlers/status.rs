use anyhow::{Result, bail};
use brutus_azure::Evaluator;

use crate::config::Config;
use crate::console::{AuthStatus, ConsoleMessage, ConsoleState, Task, run_task};
use crate::presentation::presenters::{access_panel, environment_panel};
use crate::presentation::views::PanelText;

pub fn handle(config: &Config, demo: bool) -> Result<()> {
    let evaluator = super::evaluator(config, demo)?;
    let runtime = super::runtime()?;
    let state = runtime.block_on(collect(&evaluator, config.prefer_discovered_hierarchy));

    let colored = super::use_color();
    print!("{}", PanelText::new(&environment_panel(&state), colored));
    if state.session.is_some()
        && let Some(report) = &state.hierarchy
    {
        println!();
        print!("{}", PanelText::new(&access_panel(&report.access), colored));
    }

    if let AuthStatus::Failed(error) = &state.auth {
        bail!("authentication failed: {}", error);
    }
    if let Some(error) = &state.listing_error {
        bail!("subscription listing failed: {}", error);
    }
    Ok(())
}

/// Run the start-up task chain to completion, one task at a time, then load
/// the hierarchy once signed in.
pub async fn collect(evaluator: &Evaluator, prefer_discovered: bool) -> ConsoleState {
    let (mut state, mut queue) = ConsoleState::new().update(ConsoleMessage::Started);
    let mut hierarchy_requested = false;

    loop {
        let Some(task) = queue.pop() else {
            if hierarchy_requested || state.session.is_none() {
                break;
            }
            hierarchy_requested = true;
            queue.push(Task::LoadHierarchy {
                session: state.session.clone(),
                default_subscription: state.inventory.as_ref().and_then(|i| i.default.clone()),
            });
            continue;
        };

        let outcome = run_task(evaluator, task, prefer_discovered).await;
        let (next, tasks) = state.update(ConsoleMessage::Task(outcome));
        state = next;
        queue.extend(tasks);
    }

    state
}

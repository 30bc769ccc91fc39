use anyhow::Result;
use brutus_engine::{generate, render_tree};
use brutus_types::{StructureTemplate, SubscriptionInfo, SubscriptionState};

use crate::presentation::views::TreeText;

const PLACEHOLDER_SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";

pub fn handle(template: StructureTemplate, subscription: Option<String>) -> Result<()> {
    let lines = template_lines(template, subscription);
    let heading = format!("{} - {}", template.label(), template.description());
    print!(
        "{}",
        TreeText::new(&lines, super::use_color()).with_heading(&heading)
    );
    Ok(())
}

/// Render `template`, with the named subscription attached where the template hosts one
pub fn template_lines(template: StructureTemplate, subscription: Option<String>) -> Vec<String> {
    let subscription = subscription.map(|name| SubscriptionInfo {
        id: PLACEHOLDER_SUBSCRIPTION_ID.to_string(),
        display_name: name,
        tenant_id: String::new(),
        state: SubscriptionState::Enabled,
    });
    render_tree(&generate(template, subscription.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_is_placed_under_corp() {
        let lines = template_lines(StructureTemplate::Basic, Some("Payroll".to_string()));
        assert!(lines.iter().any(|l| l.contains("💳 Payroll (00000000...)")));
    }

    #[test]
    fn test_without_subscription_no_card_lines() {
        let lines = template_lines(StructureTemplate::Minimal, None);
        assert!(!lines.iter().any(|l| l.contains("💳")));
    }
}

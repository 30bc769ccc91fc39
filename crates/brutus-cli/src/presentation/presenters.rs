//! Pure functions from console state to view models.

use brutus_engine::{NO_STRUCTURE_PLACEHOLDER, generate, render_tree, render_truncated};
use brutus_types::{HierarchyAccess, HierarchySource, StructureTemplate, SubscriptionInventory};

use super::view_models::{
    ColumnViewModel, ComparisonViewModel, MenuViewModel, PanelViewModel, ScreenViewModel,
    SectionViewModel, StatusBarViewModel, StatusLevel,
};
use crate::console::state::{
    COMPARISON_OPTIONS, CONFIRMATION_OPTIONS, HIERARCHY_ACTIONS, MAIN_MENU_ITEMS,
};
use crate::console::{AuthStatus, ConsoleState, Screen};

pub const HEADER: &str = "🏛️  BRUTUS - Azure CAF Bootstrap Tool";

const HELP: &str = "Use ↑/↓ to navigate • Enter to select • ESC to go back • q to quit";
const HELP_COMPARISON: &str =
    "Use ↑/↓ to navigate • ←/→ to change structure type • Enter to select • ESC to go back • q to quit";

const ENVIRONMENT_SUBSCRIPTIONS_SHOWN: usize = 3;
const SETUP_SUBSCRIPTIONS_SHOWN: usize = 5;

const ACCESS_GUIDANCE: [&str; 12] = [
    "",
    "📋 Required Roles:",
    "   • Management Group Reader (read access)",
    "   • Management Group Contributor (full access)",
    "",
    "🔧 How to get access:",
    "   1. Ask your Azure AD Global Administrator",
    "   2. Request assignment at Tenant Root Group level",
    "   3. Or enable 'Access management for Azure resources'",
    "      in Azure AD Properties (if you're Global Admin)",
    "",
    "💡 Currently showing mock CAF structure for demonstration",
];

const CONFIRMATION_WARNING: [&str; 9] = [
    "🚨 WARNING: This action will modify your Azure management group structure!",
    "",
    "📋 What will happen:",
    "   • Create new management groups according to CAF recommendations",
    "   • Move existing subscriptions to appropriate management groups",
    "   • Apply Azure Policy assignments for compliance",
    "   • Set up RBAC role assignments",
    "",
    "💡 This is a MOCK operation - no actual changes will be made",
];

pub fn build_screen(state: &ConsoleState, pending_tasks: usize, preview_lines: usize) -> ScreenViewModel {
    let sections = match state.screen {
        Screen::MainMenu => vec![
            SectionViewModel::Panel(environment_panel(state)),
            SectionViewModel::Menu(menu(None, &MAIN_MENU_ITEMS, state.selection, None)),
        ],
        Screen::AzureSetup => vec![SectionViewModel::Panel(azure_setup_panel(state))],
        Screen::HierarchySetup => {
            let mut sections = Vec::new();
            if let Some(panel) = permission_panel(state) {
                sections.push(SectionViewModel::Panel(panel));
            }
            sections.push(SectionViewModel::Panel(structure_panel(state)));
            sections.push(SectionViewModel::Menu(menu(
                Some("⚙️ Management Group Actions"),
                &HIERARCHY_ACTIONS,
                state.selection,
                state.feedback.clone(),
            )));
            sections
        }
        Screen::StructureComparison => vec![
            SectionViewModel::Panel(template_picker_panel(state.selected_template())),
            SectionViewModel::Comparison(comparison(state)),
            SectionViewModel::Menu(menu(
                Some("⚙️ Actions"),
                &COMPARISON_OPTIONS,
                state.selection,
                None,
            )),
        ],
        Screen::Confirmation => vec![
            SectionViewModel::Panel(PanelViewModel {
                title: "⚠️  Confirm CAF Structure Application".to_string(),
                lines: CONFIRMATION_WARNING.iter().map(|l| l.to_string()).collect(),
                level: StatusLevel::Error,
            }),
            SectionViewModel::Panel(confirmation_details(state, preview_lines)),
            SectionViewModel::Menu(menu(
                Some("🤔 Are you sure you want to proceed?"),
                &CONFIRMATION_OPTIONS,
                state.selection,
                None,
            )),
        ],
        Screen::ResourceCreation => vec![SectionViewModel::Panel(PanelViewModel {
            title: "📦 Create Bootstrap Resources".to_string(),
            lines: vec!["Resource Creation - Coming Soon".to_string()],
            level: StatusLevel::Info,
        })],
    };

    ScreenViewModel {
        header: HEADER.to_string(),
        sections,
        status_bar: status_bar(state, pending_tasks),
    }
}

fn menu(
    title: Option<&str>,
    items: &[&str],
    selection: usize,
    feedback: Option<String>,
) -> MenuViewModel {
    MenuViewModel {
        title: title.map(str::to_string),
        items: items.iter().map(|i| i.to_string()).collect(),
        selected: selection.min(items.len().saturating_sub(1)),
        feedback,
    }
}

/// Line describing the sign-in state, shared by the status bar and panels
pub fn auth_status_line(state: &ConsoleState) -> (String, StatusLevel) {
    match &state.auth {
        AuthStatus::NotStarted => ("Not connected to Azure".to_string(), StatusLevel::Info),
        AuthStatus::Authenticating => (
            "🔄 Initializing Azure authentication...".to_string(),
            StatusLevel::Info,
        ),
        AuthStatus::Connected => {
            let default = state.inventory.as_ref().and_then(|i| i.default.as_ref());
            let message = match default {
                Some(sub) => format!("✅ Connected to Azure - {}", sub.display_name),
                None => "✅ Connected to Azure".to_string(),
            };
            (message, StatusLevel::Success)
        }
        AuthStatus::Failed(error) => (
            format!("❌ Authentication failed: {}", error),
            StatusLevel::Error,
        ),
    }
}

fn status_bar(state: &ConsoleState, pending_tasks: usize) -> StatusBarViewModel {
    let (message, level) = if let Some(error) = &state.listing_error {
        (
            format!("❌ Subscription listing failed: {}", error),
            StatusLevel::Error,
        )
    } else if let Some(error) = state
        .hierarchy_error
        .as_ref()
        .filter(|_| state.screen == Screen::HierarchySetup)
    {
        (
            format!("⚠️ Management group refresh failed: {}", error),
            StatusLevel::Warning,
        )
    } else {
        auth_status_line(state)
    };

    let help = if state.screen == Screen::StructureComparison {
        HELP_COMPARISON
    } else {
        HELP
    };

    StatusBarViewModel {
        message,
        level,
        pending_tasks,
        help: help.to_string(),
    }
}

/// Identity, subscriptions and readiness of the connected tenant
pub fn environment_panel(state: &ConsoleState) -> PanelViewModel {
    let (auth_line, _) = auth_status_line(state);
    match &state.auth {
        AuthStatus::Authenticating => {
            return PanelViewModel {
                title: "🔄 Azure Environment Status".to_string(),
                lines: vec![auth_line],
                level: StatusLevel::Info,
            };
        }
        AuthStatus::Failed(_) | AuthStatus::NotStarted => {
            return PanelViewModel {
                title: "❌ Azure Environment Status".to_string(),
                lines: vec![
                    auth_line,
                    "Please ensure you're authenticated with 'az login'".to_string(),
                ],
                level: StatusLevel::Error,
            };
        }
        AuthStatus::Connected => {}
    }

    let mut lines = Vec::new();
    if let Some(session) = &state.session {
        lines.push(format!("👤 User: {}", session.principal));
        lines.push(format!("🔐 Auth Method: {}", session.method));
    }
    let tenant = state
        .inventory
        .as_ref()
        .and_then(SubscriptionInventory::tenant_id)
        .unwrap_or("Unknown");
    lines.push(format!("🏢 Tenant ID: {}", tenant));
    if let Some(report) = &state.permissions {
        lines.push(format!("🔑 Permission Level: {}", report.level));
    } else if state.permissions_in_flight {
        lines.push("🔑 Permission Level: checking...".to_string());
    }
    lines.push(String::new());

    lines.push("📋 Subscriptions:".to_string());
    match (&state.inventory, &state.listing_error) {
        (_, Some(error)) => lines.push(format!("   ❌ {}", error)),
        (None, None) => lines.push("   Loading subscriptions...".to_string()),
        (Some(inventory), None) => {
            lines.push(format!("   {}", inventory.summary()));
            let enabled = inventory.enabled();
            for sub in enabled.iter().take(ENVIRONMENT_SUBSCRIPTIONS_SHOWN) {
                let marker = if inventory.is_default(sub) { "► " } else { "  " };
                lines.push(format!(
                    "   {}{} ({})",
                    marker,
                    sub.display_name,
                    sub.short_id()
                ));
            }
            if enabled.len() > ENVIRONMENT_SUBSCRIPTIONS_SHOWN {
                lines.push(format!(
                    "   ... and {} more",
                    enabled.len() - ENVIRONMENT_SUBSCRIPTIONS_SHOWN
                ));
            }
        }
    }
    lines.push(String::new());

    match (&state.permissions, &state.inventory) {
        (Some(report), _) => lines.push(format!("🏗️ CAF Capability: {}", report.capability)),
        (None, Some(inventory)) if inventory.is_caf_ready() => {
            lines.push("🏗️ CAF Ready: ✅ Ready for CAF deployment".to_string())
        }
        _ => lines.push("🏗️ CAF Ready: ❌ No enabled subscriptions".to_string()),
    }
    let scope = state
        .inventory
        .as_ref()
        .map_or("No location data", SubscriptionInventory::scope_info);
    lines.push(format!("🌍 Scope: {}", scope));

    PanelViewModel {
        title: "🌐 Azure Environment Status".to_string(),
        lines,
        level: StatusLevel::Success,
    }
}

fn azure_setup_panel(state: &ConsoleState) -> PanelViewModel {
    let (auth_line, level) = auth_status_line(state);
    let mut lines = Vec::new();
    match &state.auth {
        AuthStatus::Authenticating => {
            lines.push(auth_line);
            lines.push(String::new());
            lines.push("This will use your existing 'az login' session...".to_string());
        }
        AuthStatus::Connected => {
            lines.push(auth_line);
            lines.push(String::new());
            if let Some(inventory) = &state.inventory {
                lines.push(format!(
                    "Tenant ID: {}",
                    inventory.tenant_id().unwrap_or("Unknown")
                ));
                lines.push(String::new());
                if !inventory.subscriptions.is_empty() {
                    lines.push("Available Subscriptions:".to_string());
                    for sub in inventory.subscriptions.iter().take(SETUP_SUBSCRIPTIONS_SHOWN) {
                        lines.push(format!("  • {} ({})", sub.display_name, sub.id));
                    }
                    if inventory.subscriptions.len() > SETUP_SUBSCRIPTIONS_SHOWN {
                        lines.push(format!(
                            "  ... and {} more",
                            inventory.subscriptions.len() - SETUP_SUBSCRIPTIONS_SHOWN
                        ));
                    }
                    lines.push(String::new());
                }
            }
            if let Some(report) = &state.permissions {
                lines.push(format!("🔑 Permission Level: {}", report.level));
                lines.push(format!("🏗️ CAF Capability: {}", report.capability));
                lines.push(String::new());
            }
            lines.push("Press Enter to re-evaluate permissions.".to_string());
        }
        AuthStatus::Failed(_) => {
            lines.push(auth_line);
            lines.push(String::new());
            lines.push("Please ensure you are logged in with 'az login' and try again.".to_string());
        }
        AuthStatus::NotStarted => {
            lines.push("Authentication will be performed using your Azure CLI session.".to_string());
            lines.push(String::new());
            lines.push("Make sure you're logged in with: az login".to_string());
        }
    }

    PanelViewModel {
        title: "🔧 Azure Environment Setup".to_string(),
        lines,
        level,
    }
}

fn permission_panel(state: &ConsoleState) -> Option<PanelViewModel> {
    if state.session.is_none() || state.hierarchy_in_flight {
        return None;
    }
    let access = &state.hierarchy.as_ref()?.access;
    Some(access_panel(access))
}

/// Read access summary, or guidance on obtaining it
pub fn access_panel(access: &HierarchyAccess) -> PanelViewModel {
    if access.has_read_access {
        return PanelViewModel {
            title: "ℹ️  Management Group Permissions".to_string(),
            lines: vec![access.status.clone()],
            level: StatusLevel::Success,
        };
    }

    let mut lines = vec![access.status.clone()];
    lines.extend(ACCESS_GUIDANCE.iter().map(|l| l.to_string()));
    PanelViewModel {
        title: "⚠️  Management Group Access Required".to_string(),
        lines,
        level: StatusLevel::Error,
    }
}

fn structure_panel(state: &ConsoleState) -> PanelViewModel {
    let mut lines = Vec::new();
    let mut level = StatusLevel::Success;

    if state.hierarchy_in_flight {
        lines.push("🔄 Loading management groups...".to_string());
        level = StatusLevel::Info;
    } else if let Some(report) = &state.hierarchy {
        if report.source == HierarchySource::Mock {
            lines.push("📋 Mock CAF Structure (Demo)".to_string());
            lines.push(String::new());
            level = StatusLevel::Warning;
        }
        lines.extend(render_tree(&report.tree));
    } else {
        lines.push("❌ No management group structure available".to_string());
        lines.push(String::new());
        lines.push("Use the 'Refresh Management Groups' option to load the structure.".to_string());
        level = StatusLevel::Error;
    }

    PanelViewModel {
        title: "🏗️ CAF Management Group Structure".to_string(),
        lines,
        level,
    }
}

fn template_picker_panel(selected: StructureTemplate) -> PanelViewModel {
    let mut lines = vec!["Select recommended structure type:".to_string(), String::new()];
    for template in StructureTemplate::ALL {
        let marker = if template == selected { "► " } else { "  " };
        lines.push(format!(
            "{}{} - {}",
            marker,
            template.label(),
            template.description()
        ));
    }
    PanelViewModel {
        title: "🏗️ Apply Basic CAF Management Structure".to_string(),
        lines,
        level: StatusLevel::Warning,
    }
}

fn comparison(state: &ConsoleState) -> ComparisonViewModel {
    let default = state.inventory.as_ref().and_then(|i| i.default.as_ref());
    let current = match &state.hierarchy {
        Some(report) => render_tree(&report.tree),
        None => vec![NO_STRUCTURE_PLACEHOLDER.to_string()],
    };
    let recommended = render_tree(&generate(state.selected_template(), default));

    ComparisonViewModel {
        current: ColumnViewModel {
            title: "Current Structure".to_string(),
            lines: current,
        },
        recommended: ColumnViewModel {
            title: "Recommended Structure".to_string(),
            lines: recommended,
        },
    }
}

fn confirmation_details(state: &ConsoleState, preview_lines: usize) -> PanelViewModel {
    let template = state.selected_template();
    let default = state.inventory.as_ref().and_then(|i| i.default.as_ref());
    let mut lines = vec!["🏗️ Management Groups to be created:".to_string(), String::new()];
    lines.extend(render_truncated(&generate(template, default), preview_lines));

    PanelViewModel {
        title: format!("📊 Selected Structure: {}", template.label()),
        lines,
        level: StatusLevel::Info,
    }
}

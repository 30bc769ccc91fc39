//! Recommended CAF structures.
//!
//! Each template is a flat table of rows. A row names its parent by path
//! (node names joined with `/`, empty for the root), so adding a template or a
//! node is a data change. Levels are derived from the path depth, which keeps
//! `child.level == parent.level + 1` true by construction.

use brutus_types::{ManagementGroupNode, StructureTemplate, SubscriptionInfo};

/// Name of the node that receives the default subscription
const SUBSCRIPTION_HOST: &str = "Corp";

struct Row {
    parent: &'static str,
    id: &'static str,
    name: &'static str,
    display_name: &'static str,
}

const fn row(
    parent: &'static str,
    id: &'static str,
    name: &'static str,
    display_name: &'static str,
) -> Row {
    Row {
        parent,
        id,
        name,
        display_name,
    }
}

const ROOT: &str = "";
const TENANT: &str = "Tenant Root";
const PLATFORM: &str = "Tenant Root/Platform";
const LANDING_ZONES: &str = "Tenant Root/Landing Zones";

const BASIC: &[Row] = &[
    row(ROOT, "mg-tenant-root", "Tenant Root", "Tenant Root Group"),
    row(TENANT, "mg-platform", "Platform", "Platform"),
    row(TENANT, "mg-landingzones", "Landing Zones", "Landing Zones"),
    row(TENANT, "mg-sandbox", "Sandbox", "Sandbox"),
    row(PLATFORM, "mg-management", "Management", "Management"),
    row(PLATFORM, "mg-connectivity", "Connectivity", "Connectivity"),
    row(PLATFORM, "mg-identity", "Identity", "Identity"),
    row(LANDING_ZONES, "mg-corp", "Corp", "Corporate"),
    row(LANDING_ZONES, "mg-online", "Online", "Online"),
];

const ENTERPRISE: &[Row] = &[
    row(ROOT, "mg-tenant-root", "Tenant Root", "Tenant Root Group"),
    row(TENANT, "mg-platform", "Platform", "Platform"),
    row(TENANT, "mg-landingzones", "Landing Zones", "Landing Zones"),
    row(TENANT, "mg-sandbox", "Sandbox", "Sandbox"),
    row(TENANT, "mg-decommissioned", "Decommissioned", "Decommissioned"),
    row(PLATFORM, "mg-management", "Management", "Management"),
    row(PLATFORM, "mg-connectivity", "Connectivity", "Connectivity"),
    row(PLATFORM, "mg-identity", "Identity", "Identity"),
    row(PLATFORM, "mg-security", "Security", "Security"),
    row(LANDING_ZONES, "mg-corp", "Corp", "Corporate"),
    row(LANDING_ZONES, "mg-online", "Online", "Online"),
    row(LANDING_ZONES, "mg-sap", "SAP", "SAP"),
    row(LANDING_ZONES, "mg-avs", "AVS", "Azure VMware Solution"),
];

const MINIMAL: &[Row] = &[
    row(ROOT, "mg-tenant-root", "Tenant Root", "Tenant Root Group"),
    row(TENANT, "mg-platform", "Platform", "Platform"),
    row(TENANT, "mg-landingzones", "Landing Zones", "Landing Zones"),
    row(LANDING_ZONES, "mg-corp", "Corp", "Corporate"),
];

fn rows_for(template: StructureTemplate) -> &'static [Row] {
    match template {
        StructureTemplate::Basic => BASIC,
        StructureTemplate::Enterprise => ENTERPRISE,
        StructureTemplate::Minimal => MINIMAL,
    }
}

/// Build a fresh tree for `template`.
///
/// The default subscription, when given, is attached to the Corp node. Every
/// call allocates a new tree, so two results never share nodes.
pub fn generate(
    template: StructureTemplate,
    default_subscription: Option<&SubscriptionInfo>,
) -> ManagementGroupNode {
    let mut root = build(rows_for(template));

    if let Some(sub) = default_subscription
        && let Some(host) = root.find_mut(SUBSCRIPTION_HOST)
    {
        host.subscriptions.push(sub.clone());
    }

    root
}

/// The canonical demonstration hierarchy shown when the real one is unavailable
pub fn mock_hierarchy(default_subscription: Option<&SubscriptionInfo>) -> ManagementGroupNode {
    generate(StructureTemplate::Basic, default_subscription)
}

fn build(rows: &[Row]) -> ManagementGroupNode {
    let (root_row, rest) = match rows.split_first() {
        Some(split) => split,
        None => return ManagementGroupNode::new("mg-tenant-root", TENANT, "Tenant Root Group", 0),
    };

    let mut root =
        ManagementGroupNode::new(root_row.id, root_row.name, root_row.display_name, 0);

    for row in rest {
        let segments: Vec<&str> = row.parent.split('/').collect();
        let level = segments.len();
        if let Some(parent) = node_at_path(&mut root, &segments) {
            parent.children.push(ManagementGroupNode::new(
                row.id,
                row.name,
                row.display_name,
                level,
            ));
        }
    }

    root
}

fn node_at_path<'a>(
    root: &'a mut ManagementGroupNode,
    segments: &[&str],
) -> Option<&'a mut ManagementGroupNode> {
    let (first, rest) = segments.split_first()?;
    if root.name != *first {
        return None;
    }
    let mut current = root;
    for segment in rest {
        current = current.children.iter_mut().find(|c| c.name == *segment)?;
    }
    Some(current)
}

//! Turning a management-group listing into the hierarchy shown as "current".

use std::collections::{HashMap, HashSet};

use brutus_engine::mock_hierarchy;
use brutus_types::{
    Error, HierarchyAccess, HierarchyNodeSummary, HierarchySource, ManagementGroupNode, Result,
    SubscriptionInfo,
};

use crate::evaluator::Evaluator;
use crate::session::Session;

const SYNTHETIC_ROOT_ID: &str = "mg-tenant-root";

/// A loaded hierarchy together with the access check that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyReport {
    pub tree: ManagementGroupNode,
    pub source: HierarchySource,
    pub access: HierarchyAccess,
}

/// Pick the tree to display: the listing when it is readable, non-empty and
/// preferred, otherwise the canonical mock. Either way the default
/// subscription is shown; in a discovered tree it sits under the group the
/// listing places it in, or under the root when the listing does not say.
pub fn discover_hierarchy(
    access: &HierarchyAccess,
    default_subscription: Option<&SubscriptionInfo>,
    prefer_discovered: bool,
) -> Result<(ManagementGroupNode, HierarchySource)> {
    if prefer_discovered && access.has_read_access && !access.groups.is_empty() {
        let mut tree = assemble_tree(&access.groups)?;
        if let Some(sub) = default_subscription {
            place_subscription(&mut tree, &access.subscriptions, sub);
        }
        return Ok((tree, HierarchySource::Discovered));
    }
    Ok((mock_hierarchy(default_subscription), HierarchySource::Mock))
}

/// Build a tree from a flat listing.
///
/// Nodes whose parent is absent or not in the listing become top-level. A
/// single top-level node is the root; several are placed under a synthetic
/// tenant root. Duplicate ids and parent cycles are rejected.
pub fn assemble_tree(groups: &[HierarchyNodeSummary]) -> Result<ManagementGroupNode> {
    let mut seen = HashSet::new();
    for group in groups {
        if !seen.insert(group.id.as_str()) {
            return Err(Error::Discovery(format!(
                "management group '{}' is listed twice",
                group.id
            )));
        }
    }

    let mut children: HashMap<&str, Vec<&HierarchyNodeSummary>> = HashMap::new();
    let mut tops = Vec::new();
    for group in groups {
        match group.parent_id.as_deref() {
            Some(parent) if seen.contains(parent) && parent != group.id => {
                children.entry(parent).or_default().push(group)
            }
            Some(parent) if parent == group.id => {
                return Err(Error::Discovery(format!(
                    "management group '{}' is its own parent",
                    group.id
                )));
            }
            _ => tops.push(group),
        }
    }

    let root = match tops.as_slice() {
        [single] => build_node(single, 0, &children),
        _ => {
            let mut root = ManagementGroupNode::new(
                SYNTHETIC_ROOT_ID,
                "Tenant Root",
                "Tenant Root Group",
                0,
            );
            root.children = tops
                .iter()
                .map(|top| build_node(top, 1, &children))
                .collect();
            root
        }
    };

    let placed = root.node_count() - usize::from(tops.len() != 1);
    if placed != groups.len() {
        let stranded: Vec<&str> = groups
            .iter()
            .map(|g| g.name.as_str())
            .filter(|name| root.find(name).is_none())
            .collect();
        return Err(Error::Discovery(format!(
            "parent cycle among management groups: {}",
            stranded.join(", ")
        )));
    }

    Ok(root)
}

fn build_node(
    summary: &HierarchyNodeSummary,
    level: usize,
    children: &HashMap<&str, Vec<&HierarchyNodeSummary>>,
) -> ManagementGroupNode {
    let mut node =
        ManagementGroupNode::new(&summary.id, &summary.name, &summary.display_name, level);
    if let Some(kids) = children.get(summary.id.as_str()) {
        node.children = kids
            .iter()
            .map(|kid| build_node(kid, level + 1, children))
            .collect();
    }
    node
}

fn place_subscription(
    tree: &mut ManagementGroupNode,
    placements: &[HierarchyNodeSummary],
    subscription: &SubscriptionInfo,
) {
    let parent = placements
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(&subscription.id))
        .and_then(|p| p.parent_id.as_deref());
    if !parent.is_some_and(|id| attach_under(tree, id, subscription)) {
        tree.subscriptions.push(subscription.clone());
    }
}

/// ARM ids are matched without regard to case
fn attach_under(node: &mut ManagementGroupNode, parent_id: &str, sub: &SubscriptionInfo) -> bool {
    if node.id.eq_ignore_ascii_case(parent_id) {
        node.subscriptions.push(sub.clone());
        return true;
    }
    node.children
        .iter_mut()
        .any(|child| attach_under(child, parent_id, sub))
}

/// Access check plus discovery. Without a session the mock is returned and the
/// access status reads "not checked".
pub async fn load_hierarchy(
    evaluator: &Evaluator,
    session: Option<&Session>,
    default_subscription: Option<&SubscriptionInfo>,
    prefer_discovered: bool,
) -> Result<HierarchyReport> {
    let access = match session {
        Some(session) => evaluator.evaluate_hierarchy_access(session).await,
        None => HierarchyAccess::not_checked(),
    };
    let (tree, source) = discover_hierarchy(&access, default_subscription, prefer_discovered)?;
    tracing::info!(source = ?source, nodes = tree.node_count(), "hierarchy loaded");
    Ok(HierarchyReport {
        tree,
        source,
        access,
    })
}

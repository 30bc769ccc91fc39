use serde::{Deserialize, Serialize};

use crate::subscription::SubscriptionInfo;

/// What a hierarchy entity is: a group, or a subscription placed under one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    #[default]
    ManagementGroup,
    Subscription,
}

/// One entry of a hierarchy listing. For subscriptions `name` is the
/// subscription id and `parent_id` the resource id of the owning group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNodeSummary {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub kind: EntityKind,
}

/// Where a displayed hierarchy came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchySource {
    Discovered,
    Mock,
}

/// A governance node. Children are owned; the tree has no cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementGroupNode {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub level: usize,
    pub children: Vec<ManagementGroupNode>,
    pub subscriptions: Vec<SubscriptionInfo>,
}

impl ManagementGroupNode {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
        level: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: display_name.into(),
            level,
            children: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Pre-order traversal
    pub fn walk(&self) -> Vec<&ManagementGroupNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Last path segment of the id, e.g. `corp` for
    /// `/providers/Microsoft.Management/managementGroups/corp`
    pub fn short_id(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }

    pub fn node_count(&self) -> usize {
        self.walk().len()
    }

    /// First node in pre-order whose name matches
    pub fn find(&self, name: &str) -> Option<&ManagementGroupNode> {
        self.walk().into_iter().find(|n| n.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ManagementGroupNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the id of the first node violating `child.level == parent.level + 1`
    /// (or a non-zero root level).
    pub fn check_levels(&self) -> Result<(), String> {
        if self.level != 0 {
            return Err(self.id.clone());
        }
        fn check(node: &ManagementGroupNode) -> Result<(), String> {
            for child in &node.children {
                if child.level != node.level + 1 {
                    return Err(child.id.clone());
                }
                check(child)?;
            }
            Ok(())
        }
        check(self)
    }
}

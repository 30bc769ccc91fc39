use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hierarchy::HierarchyNodeSummary;

/// Coarse capability classification derived from role assignments.
///
/// `Custom` means assignments were read but none mapped to a known class;
/// `Unknown` means they could not be read at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
    Owner,
    Contributor,
    Reader,
    Custom,
    Unknown,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PermissionLevel::Owner => "Owner",
            PermissionLevel::Contributor => "Contributor",
            PermissionLevel::Reader => "Reader",
            PermissionLevel::Custom => "Limited/Custom",
            PermissionLevel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Outcome of a permission evaluation at subscription scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionReport {
    pub subscription_id: String,
    pub level: PermissionLevel,
    /// Human readable CAF capability line
    pub capability: String,
    pub has_owner_access: bool,
}

impl PermissionReport {
    pub fn unknown(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            level: PermissionLevel::Unknown,
            capability: "Unable to verify".to_string(),
            has_owner_access: false,
        }
    }
}

/// Why a hierarchy listing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFailure {
    Denied,
    ApiError,
}

/// Read/write capability on the management-group hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HierarchyAccess {
    pub has_read_access: bool,
    /// Never probed; stays false until a dry-run check exists
    pub has_write_access: bool,
    pub status: String,
    pub reason: String,
    pub groups: Vec<HierarchyNodeSummary>,
    /// Subscriptions seen in the listing, each naming its parent group
    pub subscriptions: Vec<HierarchyNodeSummary>,
    pub failure: Option<AccessFailure>,
}

impl HierarchyAccess {
    /// Access state when no session was available to check with
    pub fn not_checked() -> Self {
        Self {
            status: "❓ Management group access not checked".to_string(),
            reason: "Not authenticated".to_string(),
            ..Self::default()
        }
    }

    pub fn is_denied(&self) -> bool {
        self.failure == Some(AccessFailure::Denied)
    }
}

pub mod error;
pub mod hierarchy;
pub mod permission;
pub mod subscription;
pub mod template;

pub use error::{Error, Result};
pub use hierarchy::{EntityKind, HierarchyNodeSummary, HierarchySource, ManagementGroupNode};
pub use permission::{AccessFailure, HierarchyAccess, PermissionLevel, PermissionReport};
pub use subscription::{SubscriptionInfo, SubscriptionInventory, SubscriptionState};
pub use template::StructureTemplate;

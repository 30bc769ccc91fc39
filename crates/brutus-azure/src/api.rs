//! The Resource Manager surface the evaluator depends on.
//!
//! Listing calls return one page at a time so callers decide how far to
//! paginate: subscriptions are read to the end, role assignments only on the
//! first page.

use async_trait::async_trait;
use brutus_types::{HierarchyNodeSummary, Result, SubscriptionInfo};

use crate::session::Session;

/// One page of a list response plus the opaque continuation, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// A role assignment as far as permission classification cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub id: String,
    /// Missing on malformed entries; such entries are ignored
    pub role_definition_id: Option<String>,
    pub principal_id: Option<String>,
    pub scope: Option<String>,
}

#[async_trait]
pub trait ResourceManager: Send + Sync {
    async fn list_subscriptions_page(
        &self,
        session: &Session,
        next: Option<&str>,
    ) -> Result<Page<SubscriptionInfo>>;

    /// Assignments visible at `scope`, e.g. `/subscriptions/{id}`
    async fn list_role_assignments_page(
        &self,
        session: &Session,
        scope: &str,
        next: Option<&str>,
    ) -> Result<Page<RoleAssignment>>;

    /// Management groups and subscriptions, each with its parent group
    async fn list_hierarchy_entities_page(
        &self,
        session: &Session,
        next: Option<&str>,
    ) -> Result<Page<HierarchyNodeSummary>>;
}

//! In-memory tenant.
//!
//! Serves a fixed "Contoso" directory through the same traits as the live
//! client so the console can run with `--demo` and tests can exercise the
//! evaluator without a network. Denials, failures and page sizes are
//! configurable; served pages are counted.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use brutus_types::{
    EntityKind, Error, HierarchyNodeSummary, Result, SubscriptionInfo, SubscriptionState,
};

use crate::api::{Page, ResourceManager, RoleAssignment};
use crate::credential::CredentialProvider;
use crate::evaluator::Evaluator;
use crate::session::{AuthMethod, Session, StaticToken};

const DEMO_TENANT_ID: &str = "72f988bf-0000-4000-8000-00000000c0de";
const DEMO_PRINCIPAL: &str = "demo@contoso.example";
const MG_PREFIX: &str = "/providers/Microsoft.Management/managementGroups/";

pub struct DemoTenant {
    subscriptions: Vec<SubscriptionInfo>,
    role_assignments: Vec<RoleAssignment>,
    management_groups: Vec<HierarchyNodeSummary>,
    /// Served after the groups, as `getEntities` lists both
    placements: Vec<HierarchyNodeSummary>,
    page_size: usize,
    reject_sign_in: bool,
    deny_management_groups: bool,
    fail_role_assignments: bool,
    /// Pages of management groups served before every further call fails
    management_group_page_budget: Option<usize>,
    subscription_pages: AtomicUsize,
    role_assignment_pages: AtomicUsize,
    management_group_pages: AtomicUsize,
}

fn subscription(id: &str, name: &str, state: SubscriptionState) -> SubscriptionInfo {
    SubscriptionInfo {
        id: id.to_string(),
        display_name: name.to_string(),
        tenant_id: DEMO_TENANT_ID.to_string(),
        state,
    }
}

fn group(name: &str, display_name: &str, parent: Option<&str>) -> HierarchyNodeSummary {
    HierarchyNodeSummary {
        id: format!("{}{}", MG_PREFIX, name),
        name: name.to_string(),
        display_name: display_name.to_string(),
        parent_id: parent.map(|p| format!("{}{}", MG_PREFIX, p)),
        kind: EntityKind::ManagementGroup,
    }
}

fn placement(subscription: &SubscriptionInfo, parent: &str) -> HierarchyNodeSummary {
    HierarchyNodeSummary {
        id: format!("/subscriptions/{}", subscription.id),
        name: subscription.id.clone(),
        display_name: subscription.display_name.clone(),
        parent_id: Some(format!("{}{}", MG_PREFIX, parent)),
        kind: EntityKind::Subscription,
    }
}

fn role(subscription_id: &str, role_guid: &str) -> RoleAssignment {
    RoleAssignment {
        id: format!(
            "/subscriptions/{}/providers/Microsoft.Authorization/roleAssignments/{}",
            subscription_id, role_guid
        ),
        role_definition_id: Some(format!(
            "/subscriptions/{}/providers/Microsoft.Authorization/roleDefinitions/{}",
            subscription_id, role_guid
        )),
        principal_id: Some(DEMO_PRINCIPAL.to_string()),
        scope: Some(format!("/subscriptions/{}", subscription_id)),
    }
}

impl DemoTenant {
    /// A small tenant with an Owner assignment and a partial hierarchy
    pub fn contoso() -> Self {
        let subscriptions = vec![
            subscription("sub-prod", "Contoso Production", SubscriptionState::Enabled),
            subscription("sub-dev", "Contoso Development", SubscriptionState::Enabled),
            subscription("sub-legacy", "Contoso Legacy", SubscriptionState::Disabled),
        ];
        let placements = vec![
            placement(&subscriptions[0], "contoso-corp-apps"),
            placement(&subscriptions[1], "contoso-sandbox"),
            placement(&subscriptions[2], DEMO_TENANT_ID),
        ];
        Self {
            subscriptions,
            role_assignments: vec![
                role("sub-prod", "8e3af657-a8ff-443c-a75c-2fe8c4bcb635"),
                role("sub-prod", "acdd72a7-3385-48ef-bd42-f606fba81ae7"),
            ],
            management_groups: vec![
                group(DEMO_TENANT_ID, "Tenant Root Group", None),
                group("contoso", "Contoso", Some(DEMO_TENANT_ID)),
                group("contoso-platform", "Platform", Some("contoso")),
                group("contoso-workloads", "Workloads", Some("contoso")),
                group("contoso-corp-apps", "Corp Apps", Some("contoso-workloads")),
                group("contoso-sandbox", "Sandbox", Some(DEMO_TENANT_ID)),
            ],
            placements,
            page_size: 100,
            reject_sign_in: false,
            deny_management_groups: false,
            fail_role_assignments: false,
            management_group_page_budget: None,
            subscription_pages: AtomicUsize::new(0),
            role_assignment_pages: AtomicUsize::new(0),
            management_group_pages: AtomicUsize::new(0),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_subscriptions(mut self, subscriptions: Vec<SubscriptionInfo>) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    pub fn with_role_assignments(mut self, assignments: Vec<RoleAssignment>) -> Self {
        self.role_assignments = assignments;
        self
    }

    pub fn with_management_groups(mut self, groups: Vec<HierarchyNodeSummary>) -> Self {
        self.management_groups = groups;
        self
    }

    pub fn reject_sign_in(mut self) -> Self {
        self.reject_sign_in = true;
        self
    }

    pub fn deny_management_groups(mut self) -> Self {
        self.deny_management_groups = true;
        self
    }

    pub fn with_role_assignment_failure(mut self) -> Self {
        self.fail_role_assignments = true;
        self
    }

    pub fn fail_management_groups_after(mut self, pages: usize) -> Self {
        self.management_group_page_budget = Some(pages);
        self
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn management_group_count(&self) -> usize {
        self.management_groups.len()
    }

    pub fn subscription_pages_served(&self) -> usize {
        self.subscription_pages.load(Ordering::SeqCst)
    }

    pub fn role_assignment_pages_served(&self) -> usize {
        self.role_assignment_pages.load(Ordering::SeqCst)
    }

    /// A session bound to this tenant, without going through sign-in
    pub fn session(&self) -> Session {
        Session::new(
            AuthMethod::Demo,
            DEMO_PRINCIPAL,
            Arc::new(StaticToken("demo-token".to_string())),
        )
    }

    pub fn into_evaluator(self) -> Evaluator {
        let tenant = Arc::new(self);
        Evaluator::new(tenant.clone(), tenant)
    }

    fn paginate<T: Clone>(&self, items: &[T], next: Option<&str>) -> Result<Page<T>> {
        let offset = match next {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| Error::Api {
                status: 400,
                message: format!("invalid continuation '{}'", token),
            })?,
        };
        let start = offset.min(items.len());
        let end = (start + self.page_size).min(items.len());
        Ok(Page {
            items: items[start..end].to_vec(),
            next: (end < items.len()).then(|| end.to_string()),
        })
    }
}

#[async_trait]
impl CredentialProvider for DemoTenant {
    async fn authenticate(&self) -> Result<Session> {
        if self.reject_sign_in {
            return Err(Error::Auth("demo tenant rejected sign-in".to_string()));
        }
        tracing::info!(principal = DEMO_PRINCIPAL, "signed in to demo tenant");
        Ok(self.session())
    }
}

#[async_trait]
impl ResourceManager for DemoTenant {
    async fn list_subscriptions_page(
        &self,
        _session: &Session,
        next: Option<&str>,
    ) -> Result<Page<SubscriptionInfo>> {
        self.subscription_pages.fetch_add(1, Ordering::SeqCst);
        self.paginate(&self.subscriptions, next)
    }

    async fn list_role_assignments_page(
        &self,
        _session: &Session,
        scope: &str,
        next: Option<&str>,
    ) -> Result<Page<RoleAssignment>> {
        self.role_assignment_pages.fetch_add(1, Ordering::SeqCst);
        if self.fail_role_assignments {
            return Err(Error::Api {
                status: 500,
                message: "role assignment service unavailable".to_string(),
            });
        }
        let visible: Vec<RoleAssignment> = self
            .role_assignments
            .iter()
            .filter(|a| a.scope.as_deref().is_none_or(|s| s == scope))
            .cloned()
            .collect();
        self.paginate(&visible, next)
    }

    async fn list_hierarchy_entities_page(
        &self,
        _session: &Session,
        next: Option<&str>,
    ) -> Result<Page<HierarchyNodeSummary>> {
        let served = self.management_group_pages.fetch_add(1, Ordering::SeqCst);
        if self.deny_management_groups {
            return Err(Error::Authorization {
                status: Some(403),
                message: "AuthorizationFailed: caller cannot read management groups".to_string(),
            });
        }
        if let Some(budget) = self.management_group_page_budget
            && served >= budget
        {
            return Err(Error::Network("connection reset while paging".to_string()));
        }
        let entities: Vec<HierarchyNodeSummary> = self
            .management_groups
            .iter()
            .chain(&self.placements)
            .cloned()
            .collect();
        self.paginate(&entities, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_paging_walks_every_item_once() {
        let tenant = DemoTenant::contoso().with_page_size(4);
        let session = tenant.session();

        let first = tenant.list_hierarchy_entities_page(&session, None).await.unwrap();
        assert_eq!(first.items.len(), 4);
        assert_eq!(first.next.as_deref(), Some("4"));

        let second = tenant
            .list_hierarchy_entities_page(&session, first.next.as_deref())
            .await
            .unwrap();
        assert_eq!(second.items.len(), 4);
        assert_eq!(second.next.as_deref(), Some("8"));

        let third = tenant
            .list_hierarchy_entities_page(&session, second.next.as_deref())
            .await
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert_eq!(third.items[0].kind, EntityKind::Subscription);
        assert_eq!(third.next, None);
    }

    #[tokio::test]
    async fn test_rejected_sign_in() {
        let tenant = DemoTenant::contoso().reject_sign_in();
        assert!(matches!(tenant.authenticate().await, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_role_assignments_filtered_by_scope() {
        let tenant = DemoTenant::contoso();
        let session = tenant.session();
        let prod = tenant
            .list_role_assignments_page(&session, "/subscriptions/sub-prod", None)
            .await
            .unwrap();
        assert_eq!(prod.items.len(), 2);

        let dev = tenant
            .list_role_assignments_page(&session, "/subscriptions/sub-dev", None)
            .await
            .unwrap();
        assert!(dev.items.is_empty());
    }

    #[tokio::test]
    async fn test_bad_continuation_is_api_error() {
        let tenant = DemoTenant::contoso();
        let session = tenant.session();
        let err = tenant
            .list_subscriptions_page(&session, Some("not-a-number"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }
}

//! Identity and permission evaluation.
//!
//! Authentication and subscription listing propagate their errors. Permission
//! and hierarchy checks never fail: they degrade to an `Unknown` report or a
//! denied/API-error access state and log the cause.

use std::sync::Arc;

use brutus_types::{
    AccessFailure, EntityKind, Error, HierarchyAccess, PermissionLevel, PermissionReport, Result,
    SubscriptionInfo,
};

use crate::api::{ResourceManager, RoleAssignment};
use crate::credential::{CredentialChain, CredentialProvider};
use crate::session::Session;
use crate::settings::AzureSettings;

const OWNER_ROLE: &str = "8e3af657-a8ff-443c-a75c-2fe8c4bcb635";
const CONTRIBUTOR_ROLE: &str = "b24988ac-6180-42a0-ab88-20f7382dd24c";
const READER_ROLE: &str = "acdd72a7-3385-48ef-bd42-f606fba81ae7";
const USER_ACCESS_ADMIN_ROLE: &str = "18d7d88d-d35e-4fb5-a5c3-7773c20a72d9";

const DENIAL_MARKERS: [&str; 3] = ["forbidden", "authorization", "access denied"];

/// Credential source and Resource Manager bundled for background tasks
#[derive(Clone)]
pub struct Evaluator {
    credentials: Arc<dyn CredentialProvider>,
    arm: Arc<dyn ResourceManager>,
}

impl Evaluator {
    pub fn new(credentials: Arc<dyn CredentialProvider>, arm: Arc<dyn ResourceManager>) -> Self {
        Self { credentials, arm }
    }

    /// Live Azure: environment credential chain plus the REST client
    pub fn live(settings: &AzureSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let credentials = CredentialChain::from_environment(settings, http.clone());
        let arm = crate::client::ArmClient::new(http, settings);
        Ok(Self::new(Arc::new(credentials), Arc::new(arm)))
    }

    pub fn arm(&self) -> &dyn ResourceManager {
        self.arm.as_ref()
    }

    pub async fn authenticate(&self) -> Result<Session> {
        self.credentials.authenticate().await
    }

    pub async fn list_subscriptions(&self, session: &Session) -> Result<Vec<SubscriptionInfo>> {
        list_subscriptions(self.arm(), session).await
    }

    pub async fn evaluate_permissions(
        &self,
        session: &Session,
        subscription_id: &str,
    ) -> PermissionReport {
        evaluate_permissions(self.arm(), session, subscription_id).await
    }

    pub async fn evaluate_hierarchy_access(&self, session: &Session) -> HierarchyAccess {
        evaluate_hierarchy_access(self.arm(), session).await
    }
}

/// All subscriptions visible to the session, following every continuation
pub async fn list_subscriptions(
    arm: &dyn ResourceManager,
    session: &Session,
) -> Result<Vec<SubscriptionInfo>> {
    let mut all = Vec::new();
    let mut next: Option<String> = None;
    loop {
        let page = arm.list_subscriptions_page(session, next.as_deref()).await?;
        all.extend(page.items);
        match page.next {
            Some(link) => next = Some(link),
            None => break,
        }
    }
    tracing::info!(count = all.len(), "listed subscriptions");
    Ok(all)
}

/// Built-in role name for a role-definition id, keyed on its last path segment
pub fn role_name_from_id(role_definition_id: &str) -> &'static str {
    let guid = role_definition_id
        .rsplit('/')
        .next()
        .unwrap_or(role_definition_id);
    match guid.to_ascii_lowercase().as_str() {
        OWNER_ROLE => "Owner",
        CONTRIBUTOR_ROLE => "Contributor",
        READER_ROLE => "Reader",
        USER_ACCESS_ADMIN_ROLE => "User Access Administrator",
        _ => "Custom Role",
    }
}

/// Classify the assignments at a subscription scope (Owner > Contributor > Reader)
pub fn classify_assignments(
    subscription_id: &str,
    assignments: &[RoleAssignment],
) -> PermissionReport {
    let mut owner = false;
    let mut contributor = false;
    let mut reader = false;

    for role_id in assignments.iter().filter_map(|a| a.role_definition_id.as_deref()) {
        let name = role_name_from_id(role_id).to_ascii_lowercase();
        if name.contains("owner") {
            owner = true;
        } else if name.contains("contributor") {
            contributor = true;
        } else if name.contains("reader") {
            reader = true;
        }
    }

    let (level, capability) = if owner {
        (PermissionLevel::Owner, "✅ Full CAF deployment capability")
    } else if contributor {
        (
            PermissionLevel::Contributor,
            "⚠️ Resource creation (limited CAF features)",
        )
    } else if reader {
        (PermissionLevel::Reader, "❌ Read-only access")
    } else {
        (PermissionLevel::Custom, "❓ Custom permissions")
    };

    PermissionReport {
        subscription_id: subscription_id.to_string(),
        level,
        capability: capability.to_string(),
        has_owner_access: owner,
    }
}

/// Reads the first page of assignments only; any failure yields an `Unknown` report.
pub async fn evaluate_permissions(
    arm: &dyn ResourceManager,
    session: &Session,
    subscription_id: &str,
) -> PermissionReport {
    let scope = format!("/subscriptions/{}", subscription_id);
    match arm.list_role_assignments_page(session, &scope, None).await {
        Ok(page) => {
            let report = classify_assignments(subscription_id, &page.items);
            tracing::info!(
                subscription = subscription_id,
                level = %report.level,
                assignments = page.items.len(),
                "evaluated permissions"
            );
            report
        }
        Err(err) => {
            tracing::warn!(subscription = subscription_id, error = %err, "could not read role assignments");
            PermissionReport::unknown(subscription_id)
        }
    }
}

/// Denied when the transport reported 401/403, else by matching the error text
pub fn classify_failure(err: &Error) -> AccessFailure {
    if matches!(err, Error::Authorization { .. }) || matches!(err.status(), Some(401 | 403)) {
        return AccessFailure::Denied;
    }
    let text = err.to_string().to_lowercase();
    if DENIAL_MARKERS.iter().any(|marker| text.contains(marker)) {
        AccessFailure::Denied
    } else {
        AccessFailure::ApiError
    }
}

/// Access state for a failed management-group listing
pub fn access_from_failure(err: &Error) -> HierarchyAccess {
    let failure = classify_failure(err);
    let (status, reason) = match failure {
        AccessFailure::Denied => (
            "❌ Read access denied - Need Management Group Reader role".to_string(),
            "Insufficient permissions to read management groups".to_string(),
        ),
        AccessFailure::ApiError => (
            "❌ Cannot access management groups API".to_string(),
            format!("API error: {}", err),
        ),
    };
    HierarchyAccess {
        status,
        reason,
        failure: Some(failure),
        ..HierarchyAccess::default()
    }
}

pub async fn evaluate_hierarchy_access(
    arm: &dyn ResourceManager,
    session: &Session,
) -> HierarchyAccess {
    let first = match arm.list_hierarchy_entities_page(session, None).await {
        Ok(page) => page,
        Err(err) => {
            let access = access_from_failure(&err);
            tracing::warn!(error = %err, failure = ?access.failure, "management group listing failed");
            return access;
        }
    };

    let mut entities = first.items;
    let mut next = first.next;
    while let Some(link) = next.take() {
        match arm.list_hierarchy_entities_page(session, Some(&link)).await {
            Ok(page) => {
                entities.extend(page.items);
                next = page.next;
            }
            Err(err) => {
                tracing::warn!(error = %err, read = entities.len(), "stopped reading management groups");
            }
        }
    }

    let (groups, subscriptions): (Vec<_>, Vec<_>) = entities
        .into_iter()
        .partition(|e| e.kind == EntityKind::ManagementGroup);

    let status = if groups.is_empty() {
        "✅ Read access - No existing management groups".to_string()
    } else {
        format!("✅ Read access - Found {} management groups", groups.len())
    };
    tracing::info!(count = groups.len(), "management group read access confirmed");

    HierarchyAccess {
        has_read_access: true,
        has_write_access: false,
        status,
        reason: "Can list management groups".to_string(),
        groups,
        subscriptions,
        failure: None,
    }
}

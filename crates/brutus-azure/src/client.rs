//! Resource Manager REST client.
//!
//! Every call is a single authenticated request: GET for subscriptions and role
//! assignments, POST for the hierarchy entity listing. Pagination follows
//! `nextLink` only when the caller asks for the next page. Failed calls are
//! never retried.

use async_trait::async_trait;
use brutus_types::{
    EntityKind, Error, HierarchyNodeSummary, Result, SubscriptionInfo, SubscriptionState,
};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::{Page, ResourceManager, RoleAssignment};
use crate::session::Session;
use crate::settings::AzureSettings;

const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";
const ROLE_ASSIGNMENTS_API_VERSION: &str = "2022-04-01";
const MANAGEMENT_GROUPS_API_VERSION: &str = "2020-05-01";

pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ArmClient {
    pub fn new(http: reqwest::Client, settings: &AzureSettings) -> Self {
        Self {
            http,
            endpoint: settings.arm_endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str, api_version: &str) -> String {
        format!("{}{}?api-version={}", self.endpoint, path, api_version)
    }

    async fn auth_headers(&self, session: &Session) -> Result<HeaderMap> {
        let token = session.bearer_token().await?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token.secret))
            .map_err(|e| Error::Auth(format!("invalid token header: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Request `url` (or the continuation, when given) and decode an ARM list body
    async fn fetch_page<W: DeserializeOwned>(
        &self,
        method: Method,
        session: &Session,
        url: &str,
        next: Option<&str>,
    ) -> Result<ArmList<W>> {
        let url = next.unwrap_or(url);
        let mut headers = self.auth_headers(session).await?;
        if method == Method::POST {
            headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        }

        tracing::debug!(method = %method, url = %url, "ARM request");
        let resp = self
            .http
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(url = %url, status, "ARM call failed");
            return Err(error_from_status(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a non-success response to the error taxonomy
pub(crate) fn error_from_status(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ArmErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| match e.code {
            Some(code) => format!("{}: {}", code, e.message.unwrap_or_default()),
            None => e.message.unwrap_or_default(),
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => Error::Authorization {
            status: Some(status),
            message,
        },
        _ => Error::Api { status, message },
    }
}

#[async_trait]
impl ResourceManager for ArmClient {
    async fn list_subscriptions_page(
        &self,
        session: &Session,
        next: Option<&str>,
    ) -> Result<Page<SubscriptionInfo>> {
        let url = self.url("/subscriptions", SUBSCRIPTIONS_API_VERSION);
        let page: ArmList<SubscriptionWire> =
            self.fetch_page(Method::GET, session, &url, next).await?;
        Ok(page.into_page(SubscriptionInfo::from))
    }

    async fn list_role_assignments_page(
        &self,
        session: &Session,
        scope: &str,
        next: Option<&str>,
    ) -> Result<Page<RoleAssignment>> {
        let path = format!(
            "{}/providers/Microsoft.Authorization/roleAssignments",
            scope.trim_end_matches('/')
        );
        let url = self.url(&path, ROLE_ASSIGNMENTS_API_VERSION);
        let page: ArmList<RoleAssignmentWire> =
            self.fetch_page(Method::GET, session, &url, next).await?;
        Ok(page.into_page(RoleAssignment::from))
    }

    /// The plain management-group list omits parents, so the hierarchy is read
    /// through `getEntities`, which reports every group and subscription with
    /// its parent.
    async fn list_hierarchy_entities_page(
        &self,
        session: &Session,
        next: Option<&str>,
    ) -> Result<Page<HierarchyNodeSummary>> {
        let url = self.url(
            "/providers/Microsoft.Management/getEntities",
            MANAGEMENT_GROUPS_API_VERSION,
        );
        let page: ArmList<EntityWire> = self.fetch_page(Method::POST, session, &url, next).await?;
        Ok(page.into_page(HierarchyNodeSummary::from))
    }
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ArmList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

impl<T> ArmList<T> {
    fn into_page<U>(self, convert: impl Fn(T) -> U) -> Page<U> {
        Page {
            items: self.value.into_iter().map(convert).collect(),
            next: self.next_link.filter(|link| !link.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    error: Option<ArmErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionWire {
    subscription_id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    tenant_id: String,
    #[serde(default = "unknown_state")]
    state: SubscriptionState,
}

fn unknown_state() -> SubscriptionState {
    SubscriptionState::Unknown
}

impl From<SubscriptionWire> for SubscriptionInfo {
    fn from(wire: SubscriptionWire) -> Self {
        Self {
            id: wire.subscription_id,
            display_name: wire.display_name,
            tenant_id: wire.tenant_id,
            state: wire.state,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoleAssignmentWire {
    #[serde(default)]
    id: String,
    #[serde(default)]
    properties: Option<RoleAssignmentProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleAssignmentProperties {
    role_definition_id: Option<String>,
    principal_id: Option<String>,
    scope: Option<String>,
}

impl From<RoleAssignmentWire> for RoleAssignment {
    fn from(wire: RoleAssignmentWire) -> Self {
        let props = wire.properties;
        Self {
            id: wire.id,
            role_definition_id: props.as_ref().and_then(|p| p.role_definition_id.clone()),
            principal_id: props.as_ref().and_then(|p| p.principal_id.clone()),
            scope: props.and_then(|p| p.scope),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntityWire {
    id: String,
    name: String,
    #[serde(rename = "type", default)]
    entity_type: String,
    #[serde(default)]
    properties: Option<EntityProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityProperties {
    display_name: Option<String>,
    parent: Option<ParentRef>,
}

#[derive(Debug, Deserialize)]
struct ParentRef {
    id: Option<String>,
}

impl From<EntityWire> for HierarchyNodeSummary {
    fn from(wire: EntityWire) -> Self {
        let kind = if wire.entity_type.to_ascii_lowercase().ends_with("subscriptions") {
            EntityKind::Subscription
        } else {
            EntityKind::ManagementGroup
        };
        let props = wire.properties;
        let display_name = props
            .as_ref()
            .and_then(|p| p.display_name.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| wire.name.clone());
        let parent_id = props
            .and_then(|p| p.parent)
            .and_then(|p| p.id)
            .filter(|id| !id.is_empty());
        Self {
            id: wire.id,
            name: wire.name,
            display_name,
            parent_id,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status_maps_denials() {
        let body = r#"{"error":{"code":"AuthorizationFailed","message":"no access"}}"#;
        match error_from_status(403, body) {
            Error::Authorization { status, message } => {
                assert_eq!(status, Some(403));
                assert_eq!(message, "AuthorizationFailed: no access");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            error_from_status(401, ""),
            Error::Authorization { .. }
        ));
    }

    #[test]
    fn test_error_from_status_keeps_raw_body() {
        match error_from_status(500, "  upstream exploded ") {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_subscription_list_decoding() {
        let body = r#"{
            "value": [
                {"subscriptionId": "s1", "displayName": "Prod", "tenantId": "t1", "state": "Enabled"},
                {"subscriptionId": "s2", "displayName": "Old", "tenantId": "t1", "state": "Disabled"},
                {"subscriptionId": "s3", "state": "SomethingNew"}
            ],
            "nextLink": "https://management.azure.com/subscriptions?page=2"
        }"#;
        let list: ArmList<SubscriptionWire> = serde_json::from_str(body).unwrap();
        let page = list.into_page(SubscriptionInfo::from);

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].display_name, "Prod");
        assert_eq!(page.items[1].state, SubscriptionState::Disabled);
        assert_eq!(page.items[2].state, SubscriptionState::Unknown);
        assert!(page.next.is_some());
    }

    #[test]
    fn test_empty_next_link_ends_paging() {
        let body = r#"{"value": [], "nextLink": ""}"#;
        let list: ArmList<SubscriptionWire> = serde_json::from_str(body).unwrap();
        assert_eq!(list.into_page(SubscriptionInfo::from).next, None);
    }

    #[test]
    fn test_role_assignment_decoding() {
        let body = r#"{"value": [
            {"id": "a1", "properties": {
                "roleDefinitionId": "/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/8e3af657-a8ff-443c-a75c-2fe8c4bcb635",
                "principalId": "p1",
                "scope": "/subscriptions/s1"
            }},
            {"id": "a2"}
        ]}"#;
        let list: ArmList<RoleAssignmentWire> = serde_json::from_str(body).unwrap();
        let page = list.into_page(RoleAssignment::from);

        assert!(page.items[0]
            .role_definition_id
            .as_deref()
            .unwrap()
            .ends_with("8e3af657-a8ff-443c-a75c-2fe8c4bcb635"));
        assert_eq!(page.items[1].role_definition_id, None);
    }

    #[test]
    fn test_entity_decoding_keeps_parents() {
        // shape returned by POST /providers/Microsoft.Management/getEntities
        let body = r#"{"value": [
            {
                "id": "/providers/Microsoft.Management/managementGroups/tenant-1",
                "type": "Microsoft.Management/managementGroups",
                "name": "tenant-1",
                "properties": {
                    "tenantId": "tenant-1",
                    "displayName": "Tenant Root Group",
                    "parent": null,
                    "permissions": "view",
                    "numberOfDescendants": 3
                }
            },
            {
                "id": "/providers/Microsoft.Management/managementGroups/platform",
                "type": "Microsoft.Management/managementGroups",
                "name": "platform",
                "properties": {
                    "tenantId": "tenant-1",
                    "displayName": "Platform",
                    "parent": {"id": "/providers/Microsoft.Management/managementGroups/tenant-1"},
                    "permissions": "view"
                }
            },
            {
                "id": "/subscriptions/0a1b2c3d-0000-4000-8000-000000000001",
                "type": "/subscriptions",
                "name": "0a1b2c3d-0000-4000-8000-000000000001",
                "properties": {
                    "tenantId": "tenant-1",
                    "displayName": "Prod",
                    "parent": {"id": "/providers/Microsoft.Management/managementGroups/platform"}
                }
            }
        ],
        "count": 3, "nextLink": null}"#;
        let list: ArmList<EntityWire> = serde_json::from_str(body).unwrap();
        let page = list.into_page(HierarchyNodeSummary::from);

        assert_eq!(page.items[0].kind, EntityKind::ManagementGroup);
        assert_eq!(page.items[0].parent_id, None);
        assert_eq!(page.items[1].display_name, "Platform");
        assert_eq!(
            page.items[1].parent_id.as_deref(),
            Some("/providers/Microsoft.Management/managementGroups/tenant-1")
        );
        assert_eq!(page.items[2].kind, EntityKind::Subscription);
        assert_eq!(page.items[2].name, "0a1b2c3d-0000-4000-8000-000000000001");
        assert_eq!(page.next, None);
    }

    #[test]
    fn test_entities_assemble_into_nested_tree() {
        let body = r#"{"value": [
            {"id": "/providers/Microsoft.Management/managementGroups/corp", "type": "Microsoft.Management/managementGroups", "name": "corp",
             "properties": {"displayName": "Corp", "parent": {"id": "/providers/Microsoft.Management/managementGroups/lz"}}},
            {"id": "/providers/Microsoft.Management/managementGroups/root", "type": "Microsoft.Management/managementGroups", "name": "root",
             "properties": {"displayName": "Tenant Root Group", "parent": null}},
            {"id": "/providers/Microsoft.Management/managementGroups/lz", "type": "Microsoft.Management/managementGroups", "name": "lz",
             "properties": {"displayName": "Landing Zones", "parent": {"id": "/providers/Microsoft.Management/managementGroups/root"}}}
        ]}"#;
        let list: ArmList<EntityWire> = serde_json::from_str(body).unwrap();
        let groups = list.into_page(HierarchyNodeSummary::from).items;
        let tree = crate::discovery::assemble_tree(&groups).unwrap();

        assert_eq!(tree.name, "root");
        assert_eq!(tree.child_names(), vec!["lz"]);
        assert_eq!(tree.find("corp").map(|n| n.level), Some(2));
    }

    #[test]
    fn test_role_assignment_url_uses_scope() {
        let client = ArmClient::new(reqwest::Client::new(), &AzureSettings::default());
        let url = client.url(
            "/subscriptions/s1/providers/Microsoft.Authorization/roleAssignments",
            ROLE_ASSIGNMENTS_API_VERSION,
        );
        assert_eq!(
            url,
            "https://management.azure.com/subscriptions/s1/providers/Microsoft.Authorization/roleAssignments?api-version=2022-04-01"
        );
    }
}

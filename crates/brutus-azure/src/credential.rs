//! Credential chain.
//!
//! Strategies are tried in a fixed order: service principal from the
//! environment, managed identity, then the Azure CLI login. A strategy that is
//! not configured is skipped; one that is configured but fails to produce a
//! token records its reason and the chain moves on. The first strategy that
//! yields a token wins.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use brutus_types::{Error, Result};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::session::{AccessToken, AuthMethod, Session, TokenSource, current_user};
use crate::settings::AzureSettings;

/// Produces an authenticated session
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn authenticate(&self) -> Result<Session>;
}

/// One way of obtaining a token
pub trait CredentialStrategy: Send + Sync {
    fn method(&self) -> AuthMethod;

    /// False when the environment has nothing for this strategy to work with
    fn is_configured(&self) -> bool;

    /// Principal name reported for sessions built from this strategy
    fn principal(&self) -> String;

    /// Token source for this strategy; fetching the first token validates it
    fn token_source(&self) -> Arc<dyn TokenSource>;
}

pub struct CredentialChain {
    strategies: Vec<Box<dyn CredentialStrategy>>,
}

impl CredentialChain {
    pub fn new(strategies: Vec<Box<dyn CredentialStrategy>>) -> Self {
        Self { strategies }
    }

    /// The default chain, configured from process environment variables
    pub fn from_environment(settings: &AzureSettings, http: reqwest::Client) -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let service_principal = ServicePrincipalCredential::new(
            http.clone(),
            settings,
            env("AZURE_TENANT_ID"),
            env("AZURE_CLIENT_ID"),
            env("AZURE_CLIENT_SECRET"),
        );

        let managed_identity = match (env("IDENTITY_ENDPOINT"), env("IDENTITY_HEADER")) {
            (Some(endpoint), Some(header)) => Some(ManagedIdentityEndpoint::AppService {
                endpoint,
                header,
            }),
            _ => env("MSI_ENDPOINT").map(|endpoint| ManagedIdentityEndpoint::Legacy {
                endpoint,
                secret: env("MSI_SECRET"),
            }),
        };
        let managed_identity =
            ManagedIdentityCredential::new(http, settings, managed_identity, env("AZURE_CLIENT_ID"));

        let cli = AzureCliCredential::new(settings);

        Self::new(vec![
            Box::new(service_principal),
            Box::new(managed_identity),
            Box::new(cli),
        ])
    }
}

#[async_trait]
impl CredentialProvider for CredentialChain {
    async fn authenticate(&self) -> Result<Session> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            if !strategy.is_configured() {
                tracing::debug!(method = %strategy.method(), "credential not configured, skipping");
                continue;
            }

            let source = strategy.token_source();
            match source.token().await {
                Ok(_) => {
                    let session = Session::new(strategy.method(), strategy.principal(), source);
                    tracing::info!(
                        method = %session.method,
                        principal = %session.principal,
                        "authenticated"
                    );
                    return Ok(session);
                }
                Err(err) => {
                    tracing::warn!(method = %strategy.method(), error = %err, "credential failed");
                    failures.push(format!("{}: {}", strategy.method(), err));
                }
            }
        }

        if failures.is_empty() {
            return Err(Error::Auth("no credential source is configured".to_string()));
        }
        Err(Error::Auth(format!(
            "no usable credential ({})",
            failures.join("; ")
        )))
    }
}

/// Token cache shared by the network-backed strategies
struct CachedToken {
    token: Mutex<Option<AccessToken>>,
}

impl CachedToken {
    fn new() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }

    async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<AccessToken>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<AccessToken>>,
    {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref()
            && !token.needs_refresh()
        {
            return Ok(token.clone());
        }
        let token = fetch().await?;
        *guard = Some(token.clone());
        Ok(token)
    }
}

fn scope_for(arm_endpoint: &str) -> String {
    format!("{}/.default", arm_endpoint.trim_end_matches('/'))
}

fn resource_for(arm_endpoint: &str) -> String {
    format!("{}/", arm_endpoint.trim_end_matches('/'))
}

fn network_error(context: &str, err: reqwest::Error) -> Error {
    Error::Network(format!("{}: {}", context, err))
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

// ── Service principal ────────────────────────────────────────────────

struct ServicePrincipalConfig {
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

struct ServicePrincipalInner {
    http: reqwest::Client,
    authority_host: String,
    scope: String,
    config: Option<ServicePrincipalConfig>,
    cache: CachedToken,
}

/// Client-credentials grant using `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`
pub struct ServicePrincipalCredential {
    inner: Arc<ServicePrincipalInner>,
}

impl ServicePrincipalCredential {
    pub fn new(
        http: reqwest::Client,
        settings: &AzureSettings,
        tenant_id: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        let config = match (tenant_id, client_id, client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Some(ServicePrincipalConfig {
                tenant_id,
                client_id,
                client_secret,
            }),
            _ => None,
        };
        Self {
            inner: Arc::new(ServicePrincipalInner {
                http,
                authority_host: settings.authority_host.trim_end_matches('/').to_string(),
                scope: scope_for(&settings.arm_endpoint),
                config,
                cache: CachedToken::new(),
            }),
        }
    }
}

impl ServicePrincipalInner {
    fn token_url(&self, tenant_id: &str) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_host, tenant_id)
    }

    async fn fetch(&self) -> Result<AccessToken> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| Error::Auth("service principal is not configured".to_string()))?;

        let url = self.token_url(&config.tenant_id);
        tracing::debug!(url = %url, "requesting service principal token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];
        let resp = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| network_error("token request failed", e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| network_error("token response unreadable", e))?;
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: OAuthTokenResponse = serde_json::from_str(&body)?;
        let expires_at = parsed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        Ok(AccessToken::new(parsed.access_token, expires_at))
    }
}

#[async_trait]
impl TokenSource for ServicePrincipalInner {
    async fn token(&self) -> Result<AccessToken> {
        self.cache.get_or_fetch(|| self.fetch()).await
    }
}

impl CredentialStrategy for ServicePrincipalCredential {
    fn method(&self) -> AuthMethod {
        AuthMethod::ServicePrincipal
    }

    fn is_configured(&self) -> bool {
        self.inner.config.is_some()
    }

    fn principal(&self) -> String {
        self.inner
            .config
            .as_ref()
            .map(|c| c.client_id.clone())
            .unwrap_or_else(current_user)
    }

    fn token_source(&self) -> Arc<dyn TokenSource> {
        self.inner.clone()
    }
}

// ── Managed identity ─────────────────────────────────────────────────

pub enum ManagedIdentityEndpoint {
    /// `IDENTITY_ENDPOINT` + `IDENTITY_HEADER`
    AppService { endpoint: String, header: String },
    /// `MSI_ENDPOINT` (+ optional `MSI_SECRET`)
    Legacy {
        endpoint: String,
        secret: Option<String>,
    },
}

struct ManagedIdentityInner {
    http: reqwest::Client,
    resource: String,
    endpoint: Option<ManagedIdentityEndpoint>,
    client_id: Option<String>,
    cache: CachedToken,
}

pub struct ManagedIdentityCredential {
    inner: Arc<ManagedIdentityInner>,
}

impl ManagedIdentityCredential {
    pub fn new(
        http: reqwest::Client,
        settings: &AzureSettings,
        endpoint: Option<ManagedIdentityEndpoint>,
        client_id: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ManagedIdentityInner {
                http,
                resource: resource_for(&settings.arm_endpoint),
                endpoint,
                client_id,
                cache: CachedToken::new(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManagedIdentityTokenResponse {
    access_token: String,
    /// Epoch seconds, serialized as a string by most endpoints
    #[serde(default)]
    expires_on: Option<serde_json::Value>,
}

fn parse_epoch(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    Utc.timestamp_opt(secs, 0).single()
}

impl ManagedIdentityInner {
    async fn fetch(&self) -> Result<AccessToken> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| Error::Auth("managed identity endpoint is not configured".to_string()))?;

        let mut query = vec![("resource", self.resource.as_str())];
        if let Some(client_id) = self.client_id.as_deref() {
            query.push(("client_id", client_id));
        }

        let request = match endpoint {
            ManagedIdentityEndpoint::AppService { endpoint, header } => {
                query.push(("api-version", "2019-08-01"));
                self.http
                    .get(endpoint)
                    .header("X-IDENTITY-HEADER", header)
            }
            ManagedIdentityEndpoint::Legacy { endpoint, secret } => {
                query.push(("api-version", "2017-09-01"));
                let request = self.http.get(endpoint);
                match secret {
                    Some(secret) => request.header("secret", secret),
                    None => request.header("Metadata", "true"),
                }
            }
        };

        let resp = request
            .query(&query)
            .send()
            .await
            .map_err(|e| network_error("managed identity request failed", e))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| network_error("managed identity response unreadable", e))?;
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "managed identity endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: ManagedIdentityTokenResponse = serde_json::from_str(&body)?;
        let expires_at = parsed.expires_on.as_ref().and_then(parse_epoch);
        Ok(AccessToken::new(parsed.access_token, expires_at))
    }
}

#[async_trait]
impl TokenSource for ManagedIdentityInner {
    async fn token(&self) -> Result<AccessToken> {
        self.cache.get_or_fetch(|| self.fetch()).await
    }
}

impl CredentialStrategy for ManagedIdentityCredential {
    fn method(&self) -> AuthMethod {
        AuthMethod::ManagedIdentity
    }

    fn is_configured(&self) -> bool {
        self.inner.endpoint.is_some()
    }

    fn principal(&self) -> String {
        current_user()
    }

    fn token_source(&self) -> Arc<dyn TokenSource> {
        self.inner.clone()
    }
}

// ── Azure CLI ────────────────────────────────────────────────────────

struct AzureCliInner {
    resource: String,
    timeout: StdDuration,
    cache: CachedToken,
}

/// Token from the local `az` login
pub struct AzureCliCredential {
    inner: Arc<AzureCliInner>,
}

impl AzureCliCredential {
    pub fn new(settings: &AzureSettings) -> Self {
        Self {
            inner: Arc::new(AzureCliInner {
                resource: resource_for(&settings.arm_endpoint),
                timeout: settings.request_timeout,
                cache: CachedToken::new(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: String,
    /// Local time, `%Y-%m-%d %H:%M:%S%.f`
    #[serde(default)]
    expires_on: Option<String>,
    /// Epoch seconds; only emitted by newer CLI versions
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken> {
    let parsed: CliTokenResponse = serde_json::from_slice(stdout)?;
    let expires_at = parsed
        .expires_on_epoch
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .or_else(|| {
            parsed.expires_on.as_deref().and_then(|raw| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                    .ok()
                    .and_then(|naive| naive.and_local_timezone(chrono::Local).single())
                    .map(|local| local.with_timezone(&Utc))
            })
        });
    Ok(AccessToken::new(parsed.access_token, expires_at))
}

impl AzureCliInner {
    async fn fetch(&self) -> Result<AccessToken> {
        let command = tokio::process::Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                &self.resource,
                "--output",
                "json",
            ])
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| Error::Auth("az account get-access-token timed out".to_string()))?
            .map_err(|e| Error::Auth(format!("failed to run az: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Auth(format!(
                "az account get-access-token failed: {}",
                stderr.trim()
            )));
        }

        parse_cli_token(&output.stdout)
    }
}

#[async_trait]
impl TokenSource for AzureCliInner {
    async fn token(&self) -> Result<AccessToken> {
        self.cache.get_or_fetch(|| self.fetch()).await
    }
}

impl CredentialStrategy for AzureCliCredential {
    fn method(&self) -> AuthMethod {
        AuthMethod::AzureCli
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn principal(&self) -> String {
        current_user()
    }

    fn token_source(&self) -> Arc<dyn TokenSource> {
        self.inner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticToken;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStrategy {
        method: AuthMethod,
        configured: bool,
        succeeds: bool,
        attempts: Arc<AtomicUsize>,
    }

    struct FailingToken;

    #[async_trait]
    impl TokenSource for FailingToken {
        async fn token(&self) -> Result<AccessToken> {
            Err(Error::Auth("expired login".to_string()))
        }
    }

    impl CredentialStrategy for FakeStrategy {
        fn method(&self) -> AuthMethod {
            self.method
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn principal(&self) -> String {
            format!("{:?}-user", self.method)
        }

        fn token_source(&self) -> Arc<dyn TokenSource> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.succeeds {
                Arc::new(StaticToken("token".into()))
            } else {
                Arc::new(FailingToken)
            }
        }
    }

    fn fake(
        method: AuthMethod,
        configured: bool,
        succeeds: bool,
    ) -> (Box<dyn CredentialStrategy>, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        (
            Box::new(FakeStrategy {
                method,
                configured,
                succeeds,
                attempts: attempts.clone(),
            }),
            attempts,
        )
    }

    #[tokio::test]
    async fn test_unconfigured_strategies_are_skipped() {
        let (sp, sp_attempts) = fake(AuthMethod::ServicePrincipal, false, true);
        let (cli, _) = fake(AuthMethod::AzureCli, true, true);
        let chain = CredentialChain::new(vec![sp, cli]);

        let session = chain.authenticate().await.unwrap();
        assert_eq!(session.method, AuthMethod::AzureCli);
        assert_eq!(sp_attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let (sp, _) = fake(AuthMethod::ServicePrincipal, true, true);
        let (cli, cli_attempts) = fake(AuthMethod::AzureCli, true, true);
        let chain = CredentialChain::new(vec![sp, cli]);

        let session = chain.authenticate().await.unwrap();
        assert_eq!(session.method, AuthMethod::ServicePrincipal);
        assert_eq!(session.principal, "ServicePrincipal-user");
        assert_eq!(cli_attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failures_are_reported() {
        let (mi, _) = fake(AuthMethod::ManagedIdentity, true, false);
        let (cli, _) = fake(AuthMethod::AzureCli, true, false);
        let chain = CredentialChain::new(vec![mi, cli]);

        let err = chain.authenticate().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        let message = err.to_string();
        assert!(message.contains("Managed Identity"));
        assert!(message.contains("Azure CLI"));
        assert!(message.contains("expired login"));
    }

    #[tokio::test]
    async fn test_empty_chain_is_auth_error() {
        let chain = CredentialChain::new(Vec::new());
        assert!(matches!(
            chain.authenticate().await,
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_service_principal_needs_all_three_values() {
        let settings = AzureSettings::default();
        let partial = ServicePrincipalCredential::new(
            reqwest::Client::new(),
            &settings,
            Some("tenant".into()),
            Some("client".into()),
            None,
        );
        assert!(!partial.is_configured());

        let full = ServicePrincipalCredential::new(
            reqwest::Client::new(),
            &settings,
            Some("tenant".into()),
            Some("client".into()),
            Some("secret".into()),
        );
        assert!(full.is_configured());
        assert_eq!(full.principal(), "client");
        assert_eq!(
            full.inner.token_url("tenant"),
            "https://login.microsoftonline.com/tenant/oauth2/v2.0/token"
        );
        assert_eq!(full.inner.scope, "https://management.azure.com/.default");
    }

    #[test]
    fn test_parse_cli_token_prefers_epoch() {
        let json = br#"{
            "accessToken": "cli-token",
            "expiresOn": "2030-01-01 10:00:00.000000",
            "expires_on": 1893492000,
            "tenant": "t",
            "tokenType": "Bearer"
        }"#;
        let token = parse_cli_token(json).unwrap();
        assert_eq!(token.secret, "cli-token");
        assert_eq!(token.expires_at.map(|t| t.timestamp()), Some(1893492000));
    }

    #[test]
    fn test_parse_cli_token_local_time() {
        let json = br#"{"accessToken": "cli-token", "expiresOn": "2030-01-01 10:00:00.000000"}"#;
        let token = parse_cli_token(json).unwrap();
        assert!(token.expires_at.is_some());
    }

    #[test]
    fn test_parse_epoch_accepts_strings() {
        let from_string = parse_epoch(&serde_json::json!("1893492000"));
        let from_number = parse_epoch(&serde_json::json!(1893492000));
        assert_eq!(from_string, from_number);
        assert!(from_string.is_some());
    }
}

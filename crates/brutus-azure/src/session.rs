use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use brutus_types::Result;
use chrono::{DateTime, Duration, Utc};

/// How the session obtained its credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    ServicePrincipal,
    ManagedIdentity,
    AzureCli,
    Demo,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthMethod::ServicePrincipal => "Service Principal",
            AuthMethod::ManagedIdentity => "Managed Identity",
            AuthMethod::AzureCli => "Azure CLI",
            AuthMethod::Demo => "Demo Tenant",
        };
        f.write_str(label)
    }
}

/// Bearer token with its expiry, if the issuer reported one
#[derive(Clone)]
pub struct AccessToken {
    pub secret: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// Expired, or within five minutes of expiring
    pub fn needs_refresh(&self) -> bool {
        self.expires_at
            .map(|at| Utc::now() + Duration::minutes(5) >= at)
            .unwrap_or(false)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Anything that can hand out bearer tokens for Resource Manager
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<AccessToken>;
}

/// A token that never changes; used by the demo tenant and tests
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<AccessToken> {
        Ok(AccessToken::new(self.0.clone(), None))
    }
}

/// Authenticated identity shared by every background task
#[derive(Clone)]
pub struct Session {
    pub method: AuthMethod,
    pub principal: String,
    credential: Arc<dyn TokenSource>,
}

impl Session {
    pub fn new(
        method: AuthMethod,
        principal: impl Into<String>,
        credential: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            method,
            principal: principal.into(),
            credential,
        }
    }

    pub async fn bearer_token(&self) -> Result<AccessToken> {
        self.credential.token().await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("method", &self.method)
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

/// Login name of the local user, used as the principal for non-service logins
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

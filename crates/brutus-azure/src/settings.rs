use std::time::Duration;

pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Endpoints and limits for talking to Azure
#[derive(Debug, Clone)]
pub struct AzureSettings {
    pub arm_endpoint: String,
    pub authority_host: String,
    /// Applied to every HTTP call and to the `az` subprocess
    pub request_timeout: Duration,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            arm_endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

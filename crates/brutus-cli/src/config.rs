use brutus_azure::AzureSettings;
use brutus_azure::settings::{DEFAULT_ARM_ENDPOINT, DEFAULT_AUTHORITY_HOST};
use brutus_types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolve the configuration file path based on priority:
/// 1. Explicit path (`--config`)
/// 2. BRUTUS_CONFIG environment variable
/// 3. `{config_dir}/brutus/config.toml`
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("BRUTUS_CONFIG")
        && !env_path.is_empty()
    {
        return Ok(expand_tilde(Path::new(&env_path)));
    }

    dirs::config_dir()
        .map(|dir| dir.join("brutus").join("config.toml"))
        .ok_or_else(|| Error::Config("could not determine the user configuration directory".to_string()))
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    path.to_path_buf()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default filter when neither `--log-level` nor RUST_LOG is set
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub tick_rate_ms: u64,
    pub request_timeout_secs: u64,
    pub arm_endpoint: String,
    pub authority_host: String,
    pub prefer_discovered_hierarchy: bool,
    pub confirmation_preview_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            tick_rate_ms: 250,
            request_timeout_secs: 30,
            arm_endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            prefer_discovered_hierarchy: true,
            confirmation_preview_lines: 10,
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(explicit_path)?;
        Self::load_from(&path)
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_ms == 0 {
            return Err(Error::Config("tick_rate_ms must be greater than zero".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.confirmation_preview_lines == 0 {
            return Err(Error::Config(
                "confirmation_preview_lines must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn azure_settings(&self) -> AzureSettings {
        AzureSettings {
            arm_endpoint: self.arm_endpoint.clone(),
            authority_host: self.authority_host.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Configured log directory, else the platform's local data dir
    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return expand_tilde(dir);
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("brutus").join("logs"))
            .unwrap_or_else(|| std::env::temp_dir().join("brutus"))
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionState {
    Enabled,
    Disabled,
    Warned,
    PastDue,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// A subscription as reported by the subscription directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub id: String,
    pub display_name: String,
    pub tenant_id: String,
    pub state: SubscriptionState,
}

impl SubscriptionInfo {
    pub fn is_enabled(&self) -> bool {
        self.state == SubscriptionState::Enabled
    }

    /// First 8 characters of the id, suffixed with `...` when the id is longer
    pub fn short_id(&self) -> String {
        if self.id.chars().count() > 8 {
            let head: String = self.id.chars().take(8).collect();
            format!("{}...", head)
        } else {
            self.id.clone()
        }
    }
}

/// Subscriptions visible to the session plus the chosen default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionInventory {
    pub subscriptions: Vec<SubscriptionInfo>,
    pub default: Option<SubscriptionInfo>,
    /// Raised when the list holds no Enabled subscription
    pub no_deployable_subscription: bool,
}

impl SubscriptionInventory {
    /// Pick the first Enabled subscription in list order as the default.
    pub fn from_list(subscriptions: Vec<SubscriptionInfo>) -> Self {
        let default = subscriptions.iter().find(|s| s.is_enabled()).cloned();
        let no_deployable_subscription = default.is_none();
        Self {
            subscriptions,
            default,
            no_deployable_subscription,
        }
    }

    pub fn enabled(&self) -> Vec<&SubscriptionInfo> {
        self.subscriptions.iter().filter(|s| s.is_enabled()).collect()
    }

    pub fn summary(&self) -> String {
        if self.subscriptions.is_empty() {
            return "No subscriptions found".to_string();
        }
        format!(
            "{} enabled of {} total",
            self.enabled().len(),
            self.subscriptions.len()
        )
    }

    pub fn scope_info(&self) -> &'static str {
        if self.enabled().is_empty() {
            "No location data"
        } else {
            "Global scope available"
        }
    }

    pub fn is_caf_ready(&self) -> bool {
        !self.enabled().is_empty()
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.default.as_ref().map(|s| s.tenant_id.as_str())
    }

    pub fn is_default(&self, sub: &SubscriptionInfo) -> bool {
        self.default.as_ref().is_some_and(|d| d.id == sub.id)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Recommended CAF structure shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureTemplate {
    Basic,
    Enterprise,
    Minimal,
}

impl StructureTemplate {
    /// Picker order
    pub const ALL: [StructureTemplate; 3] = [
        StructureTemplate::Basic,
        StructureTemplate::Enterprise,
        StructureTemplate::Minimal,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn key(self) -> &'static str {
        match self {
            StructureTemplate::Basic => "basic",
            StructureTemplate::Enterprise => "enterprise",
            StructureTemplate::Minimal => "minimal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StructureTemplate::Basic => "Basic CAF",
            StructureTemplate::Enterprise => "Enterprise CAF",
            StructureTemplate::Minimal => "Minimal CAF",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StructureTemplate::Basic => {
                "Small-Medium organizations (Platform, Landing Zones, Sandbox)"
            }
            StructureTemplate::Enterprise => {
                "Large organizations (+ Security, SAP, AVS, Decommissioned)"
            }
            StructureTemplate::Minimal => "Startups/Simple setups (Platform + Corp only)",
        }
    }
}

impl fmt::Display for StructureTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StructureTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(StructureTemplate::Basic),
            "enterprise" => Ok(StructureTemplate::Enterprise),
            "minimal" => Ok(StructureTemplate::Minimal),
            other => Err(format!(
                "unknown template '{}' (expected basic, enterprise or minimal)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order() {
        assert_eq!(StructureTemplate::from_index(0), Some(StructureTemplate::Basic));
        assert_eq!(StructureTemplate::from_index(2), Some(StructureTemplate::Minimal));
        assert_eq!(StructureTemplate::from_index(3), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "Enterprise".parse::<StructureTemplate>(),
            Ok(StructureTemplate::Enterprise)
        );
        assert!("huge".parse::<StructureTemplate>().is_err());
    }
}

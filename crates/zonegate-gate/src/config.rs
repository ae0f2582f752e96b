//! Gateway configuration.

use crate::{GateError, Result};
use serde::{Deserialize, Serialize};
use zonegate_cloudflare::ZoneConfig;

/// Configuration for a zonegate deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Which zone the provider client operates on.
    #[serde(default)]
    pub zone: ZoneConfig,

    /// TTL applied to created records when the payload carries none
    /// (1 = provider-automatic).
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Page size for record listings when the caller names none.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Upper bound on caller-requested page sizes.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            zone: ZoneConfig::default(),
            default_ttl: default_ttl(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl GateConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| GateError::Config(e.to_string()))?;
            toml::from_str(&content).map_err(|e| GateError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Clamp a requested page size into the configured bounds.
    #[must_use]
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_per_page)
            .clamp(1, self.max_per_page)
    }
}

// Default value functions for serde.
const fn default_ttl() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    50
}

const fn default_max_per_page() -> u32 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GateConfig::default();
        assert_eq!(config.default_ttl, 1);
        assert_eq!(config.default_per_page, 50);
        assert_eq!(config.max_per_page, 500);
        assert!(!config.zone.is_configured());
    }

    #[test]
    fn test_page_size_clamping() {
        let config = GateConfig::default();
        assert_eq!(config.page_size(None), 50);
        assert_eq!(config.page_size(Some(20)), 20);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(10_000)), 500);
    }

    #[test]
    fn test_toml_round_trip() {
        let text = r#"
            default_ttl = 300

            [zone]
            name = "example.com"
        "#;
        let config: GateConfig = toml::from_str(text).unwrap();
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.zone.name.as_deref(), Some("example.com"));
        // Unset fields keep their defaults.
        assert_eq!(config.default_per_page, 50);
    }
}

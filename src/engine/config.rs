// Runtime configuration
use serde::{Deserialize, Serialize};

use crate::css::HashPriority;

/// Overrides document detection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mock {
    Server,
    Client,
}

/// Configuration for style registration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    /// Remove a stylesheet once its last consumer releases it
    pub auto_clear: bool,
    /// Pretend to run on the server or the client regardless of the attached document
    pub mock: Option<Mock>,
    /// Render inline `<style>` markup when running without a document
    pub default_cache: bool,
    pub hash_priority: HashPriority,
    /// Container stylesheets are attached to; the document head when unset
    pub container: Option<String>,
    /// Run linters and report warnings
    pub dev_warnings: bool,
    /// Prefix of scope hash classes
    pub hash_prefix: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            auto_clear: false,
            mock: None,
            default_cache: true,
            hash_priority: HashPriority::default(),
            container: None,
            dev_warnings: cfg!(debug_assertions),
            hash_prefix: "css".to_string(),
        }
    }
}

impl StyleConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = StyleConfig::from_json(r#"{ "autoClear": true, "hashPriority": "low", "mock": "server" }"#).unwrap();
        assert!(config.auto_clear);
        assert_eq!(config.hash_priority, HashPriority::Low);
        assert_eq!(config.mock, Some(Mock::Server));
        assert!(config.default_cache);
        assert_eq!(config.hash_prefix, "css");
        assert_eq!(config.container, None);
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert!(StyleConfig::from_json(r#"{ "hashPriority": "medium" }"#).is_err());
    }
}

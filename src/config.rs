//! Provider Configuration
//!
//! Handles the provider config file: a JSON document carrying the same
//! connection fields as the CLI flags. It sits between explicit flags and
//! the `rubrik_cdm_*` environment variables in credential precedence.

use crate::cdm::auth::Credentials;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Provider config file contents. The shape matches [`Credentials`] so a
/// file is simply a lower-precedence credential source.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    credentials: Credentials,
}

impl ProviderConfig {
    /// Get the default provider file path
    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rbkctl").join("provider.json"))
    }

    /// Load the provider file from the user config dir. A missing or
    /// unreadable file yields an empty source rather than an error so the
    /// CLI works with flags or environment variables alone.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self {
                credentials: serde_json::from_str(&content).unwrap_or_default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load an explicitly named provider file. Unlike [`ProviderConfig::load`],
    /// a path the operator asked for must exist and parse.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read provider file {}", path.display()))?;
        let credentials = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse provider file {}", path.display()))?;
        Ok(Self { credentials })
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_file_parses_credential_fields() {
        let content = r#"{"node_ip": "10.0.0.5", "username": "admin", "password": "pw"}"#;
        let credentials: Credentials = serde_json::from_str(content).unwrap();
        assert_eq!(credentials.node_ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(credentials.api_token, None);
    }

    #[test]
    fn malformed_default_file_yields_empty_source() {
        let credentials: Credentials =
            serde_json::from_str("{not json").unwrap_or_default();
        assert_eq!(credentials, Credentials::default());
    }
}

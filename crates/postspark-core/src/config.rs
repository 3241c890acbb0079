//! Workspace configuration and provider secrets.
//!
//! Settings live in `~/.config/postspark/config.toml`, provider credentials
//! in `~/.config/postspark/secrets.toml`. Every field is defaulted so a
//! missing file is not an error; backends additionally fall back to
//! environment variables when the secrets file has no entry for them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::quota::QuotaLimit;

/// Preferred generation provider. Fallback ordering across providers is an
/// external concern; the core only honors this single preference.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    OpenAi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of cached generations kept in memory.
    pub capacity: usize,
    /// Seconds before a cached generation expires.
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 128,
            ttl_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaSettings {
    /// Generations included per billing period; `None` means unlimited.
    pub monthly_limit: Option<u32>,
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self {
            monthly_limit: Some(10),
        }
    }
}

impl QuotaSettings {
    pub fn limit(&self) -> QuotaLimit {
        match self.monthly_limit {
            Some(limit) => QuotaLimit::Limited(limit),
            None => QuotaLimit::Unlimited,
        }
    }
}

/// Root settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderKind,
    pub cache: CacheSettings,
    pub quota: QuotaSettings,
}

impl Settings {
    /// Loads settings from the default config path, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads settings from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|err| {
            GenerationError::validation(format!("failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            GenerationError::validation(format!("invalid config {}: {err}", path.display()))
        })
    }

    /// `~/.config/postspark/config.toml`, if a config dir is resolvable.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("postspark").join("config.toml"))
    }
}

/// Credentials for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSecret {
    pub api_key: String,
    /// Optional model override; providers fall back to their default model.
    pub model: Option<String>,
}

/// Provider credentials document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secrets {
    pub anthropic: Option<ProviderSecret>,
    pub openai: Option<ProviderSecret>,
}

impl Secrets {
    /// Loads secrets from the default path; a missing file yields an empty
    /// document so env-var fallback can take over.
    pub fn load() -> Result<Self> {
        match Self::secrets_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads secrets from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|err| {
            GenerationError::validation(format!("failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            GenerationError::validation(format!("invalid secrets {}: {err}", path.display()))
        })
    }

    /// `~/.config/postspark/secrets.toml`, if a config dir is resolvable.
    pub fn secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("postspark").join("secrets.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cache.capacity, 128);
        assert_eq!(settings.quota.monthly_limit, Some(10));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "provider = \"open_ai\"\n\n[cache]\ncapacity = 4\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.provider, ProviderKind::OpenAi);
        assert_eq!(settings.cache.capacity, 4);
        assert_eq!(settings.cache.ttl_secs, 3600);
    }

    #[test]
    fn test_invalid_toml_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "provider = [not toml").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_unlimited_quota_mapping() {
        let unlimited = QuotaSettings {
            monthly_limit: None,
        };
        assert_eq!(unlimited.limit(), QuotaLimit::Unlimited);
        assert_eq!(QuotaSettings::default().limit(), QuotaLimit::Limited(10));
    }

    #[test]
    fn test_secrets_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(
            &path,
            "[anthropic]\napi_key = \"sk-test\"\nmodel = \"claude-sonnet-4-20250514\"\n",
        )
        .unwrap();

        let secrets = Secrets::load_from(&path).unwrap();
        let anthropic = secrets.anthropic.unwrap();
        assert_eq!(anthropic.api_key, "sk-test");
        assert_eq!(anthropic.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert!(secrets.openai.is_none());
    }
}

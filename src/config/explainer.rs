//! Explanation service configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Explanation service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExplainerConfig {
    #[serde(default)]
    pub enabled: bool,

    pub base_url: Option<String>,

    pub api_key: Option<Secret<String>>,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Findings explained per analysis
    #[serde(default = "default_max_findings")]
    pub max_findings: usize,
}

impl ExplainerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate explainer configuration. Nothing is required when disabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        let url = self
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ValidationError::MissingRequired("EXPLAINER__BASE_URL"))?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ValidationError::InvalidExplainerUrl);
        }
        if self.api_key.is_none() {
            return Err(ValidationError::MissingRequired("EXPLAINER__API_KEY"));
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("explainer.timeout_ms"));
        }
        Ok(())
    }
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            api_key: None,
            timeout_ms: default_timeout(),
            max_findings: default_max_findings(),
        }
    }
}

fn default_timeout() -> u64 {
    1500
}

fn default_max_findings() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> ExplainerConfig {
        ExplainerConfig {
            enabled: true,
            base_url: Some("https://explain.example.com".to_string()),
            api_key: Some(Secret::new("key".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled_needs_nothing() {
        assert!(ExplainerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_enabled_requires_url_and_key() {
        assert!(enabled().validate().is_ok());

        let config = ExplainerConfig {
            base_url: None,
            ..enabled()
        };
        assert_eq!(config.validate(), Err(ValidationError::MissingRequired("EXPLAINER__BASE_URL")));

        let config = ExplainerConfig {
            api_key: None,
            ..enabled()
        };
        assert_eq!(config.validate(), Err(ValidationError::MissingRequired("EXPLAINER__API_KEY")));
    }

    #[test]
    fn test_url_scheme() {
        let config = ExplainerConfig {
            base_url: Some("ftp://explain".to_string()),
            ..enabled()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidExplainerUrl));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ExplainerConfig {
            api_key: Some(Secret::new("sk-very-secret".to_string())),
            ..enabled()
        };
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }
}

//! HTTP Finding Explainer - Calls the external explanation service.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpExplainerConfig::new("https://explain.internal", api_key)
//!     .with_timeout(Duration::from_millis(1500));
//!
//! let explainer = HttpFindingExplainer::new(config)?;
//! ```
//!
//! The service receives a natural-language query describing the finding
//! and answers with `{ "analysis": "..." }`.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::analysis::{ConflictFinding, FindingKind};
use crate::domain::catalog::ConflictType;
use crate::ports::{ExplainerError, FindingExplainer};

/// Configuration for the HTTP explainer.
#[derive(Debug, Clone)]
pub struct HttpExplainerConfig {
    /// Base URL of the explanation service.
    pub base_url: String,
    api_key: Secret<String>,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl HttpExplainerConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Secret::new(api_key.into()),
            timeout: Duration::from_millis(1500),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Explainer backed by the explanation service's HTTP API.
pub struct HttpFindingExplainer {
    config: HttpExplainerConfig,
    client: Client,
}

impl HttpFindingExplainer {
    pub fn new(config: HttpExplainerConfig) -> Result<Self, ExplainerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExplainerError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn explain_url(&self) -> String {
        format!("{}/explain", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ExplainRequest<'a> {
    query: String,
    title: &'a str,
    severity: &'static str,
    explanation: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExplainResponse {
    analysis: String,
}

/// Question sent to the service for one finding.
fn build_query(finding: &ConflictFinding) -> String {
    let focus = match &finding.kind {
        FindingKind::Rule { conflict_type } => match conflict_type {
            ConflictType::Chemical => "chemical incompatibilities that could cause reactions",
            ConflictType::Physical => "physical formulation issues like pilling or separation",
            ConflictType::Effectiveness => "effects on the effectiveness of either ingredient",
        },
        FindingKind::SkinSensitivity => "irritation risk for this skin type",
        FindingKind::Allergen => "allergy safety concerns and contraindications",
        FindingKind::Heuristic { .. } => "pH conflicts and cumulative sun sensitivity",
    };
    format!(
        "Explain the skincare interaction '{}' ({} severity). Focus on {}, and give timing advice.",
        finding.title,
        finding.severity.as_str(),
        focus
    )
}

#[async_trait]
impl FindingExplainer for HttpFindingExplainer {
    async fn explain(&self, finding: &ConflictFinding) -> Result<String, ExplainerError> {
        let body = ExplainRequest {
            query: build_query(finding),
            title: &finding.title,
            severity: finding.severity.as_str(),
            explanation: &finding.explanation,
        };

        let response = self
            .client
            .post(self.explain_url())
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| ExplainerError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplainerError::Unavailable(format!("explanation service returned {}", status)));
        }

        let parsed: ExplainResponse = response
            .json()
            .await
            .map_err(|e| ExplainerError::InvalidResponse(e.to_string()))?;

        let text = parsed.analysis.trim();
        if text.is_empty() {
            return Err(ExplainerError::InvalidResponse("empty analysis".to_string()));
        }
        Ok(text.to_string())
    }
}

impl std::fmt::Debug for HttpFindingExplainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFindingExplainer")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

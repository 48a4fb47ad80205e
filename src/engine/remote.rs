//! HTTP client for the astrology engine sidecar.
//!
//! # Responsibilities
//! - Serialize specs to the engine's JSON API
//! - Apply the configured per-call timeout
//! - Classify upstream failures (geocoding vs. rejected vs. server error)
//!
//! # Design Decisions
//! - One attempt per call; this layer never retries
//! - Error classification is by message inspection because the engine only
//!   reports failures as text

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::engine::types::{
    classify_engine_message, AspectsSpec, ChartRender, ChartSpec, EngineError, EngineResult,
    EphemerisSpec, RelationshipScore, SubjectSpec,
};
use crate::engine::AstrologyEngine;

/// Remote astrology engine reached over HTTP.
#[derive(Clone)]
pub struct RemoteEngine {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct PairBody<'a> {
    first_subject: &'a SubjectSpec,
    second_subject: &'a SubjectSpec,
}

impl RemoteEngine {
    /// Create a new engine client from configuration, reusing the shared
    /// HTTP client.
    pub fn new(http: reqwest::Client, config: &EngineConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> EngineResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.to_string(),
            };
            tracing::warn!(path, %status, message, "Engine call failed");
            return Err(classify_engine_message(status.is_client_error(), message));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| EngineError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AstrologyEngine for RemoteEngine {
    async fn compute_subject(&self, subject: &SubjectSpec) -> EngineResult<Value> {
        self.post_json("/v1/subject", subject).await
    }

    async fn render_chart(&self, spec: &ChartSpec) -> EngineResult<ChartRender> {
        self.post_json("/v1/chart", spec).await
    }

    async fn compute_aspects(&self, spec: &AspectsSpec) -> EngineResult<Vec<Value>> {
        self.post_json("/v1/aspects", spec).await
    }

    async fn relationship_score(
        &self,
        first: &SubjectSpec,
        second: &SubjectSpec,
    ) -> EngineResult<RelationshipScore> {
        let body = PairBody {
            first_subject: first,
            second_subject: second,
        };
        self.post_json("/v1/relationship-score", &body).await
    }

    async fn composite_subject(
        &self,
        first: &SubjectSpec,
        second: &SubjectSpec,
    ) -> EngineResult<Value> {
        let body = PairBody {
            first_subject: first,
            second_subject: second,
        };
        self.post_json("/v1/composite", &body).await
    }

    async fn ephemeris_range(&self, spec: &EphemerisSpec) -> EngineResult<Vec<Value>> {
        self.post_json("/v1/ephemeris", spec).await
    }
}

impl std::fmt::Debug for RemoteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEngine")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = EngineConfig {
            base_url: "http://127.0.0.1:9000/".to_string(),
            timeout_secs: 5,
        };
        let engine = RemoteEngine::new(reqwest::Client::new(), &config);
        assert_eq!(engine.base_url, "http://127.0.0.1:9000");
        assert_eq!(engine.timeout, Duration::from_secs(5));
    }
}

//! HTTP evaluation sink
//!
//! Posts evaluation batches as JSON to a remote evaluation service.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ExecutionContext;
use crate::error::SinkError;
use crate::record::EvaluationRecord;
use crate::sink::{EvaluationSink, SinkResult};

/// Environment variable holding the sink base URL.
pub const SINK_URL_ENV: &str = "EVALLOOP_SINK_URL";
/// Environment variable holding the optional bearer token.
pub const SINK_TOKEN_ENV: &str = "EVALLOOP_SINK_TOKEN";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSinkConfig {
    /// Base URL of the evaluation service
    pub endpoint: String,
    /// Bearer token (optional for unauthenticated deployments)
    pub token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl HttpSinkConfig {
    /// Create config for a specific endpoint
    pub fn new(endpoint: &str) -> Self {
        HttpSinkConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create config from environment variables.
    ///
    /// Returns `None` when no sink URL is configured.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (used by `from_env`).
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(SINK_URL_ENV).filter(|v| !v.trim().is_empty())?;
        let mut config = Self::new(endpoint.trim());
        config.token = lookup(SINK_TOKEN_ENV).filter(|v| !v.is_empty());
        Some(config)
    }

    fn batch_url(&self) -> String {
        format!("{}/v1/evaluations", self.endpoint)
    }
}

/// Wire shape of one posted batch.
#[derive(Debug, Serialize)]
pub struct BatchPayload<'a> {
    pub context_ref: String,
    pub trace_ref: &'a str,
    pub unit_ref: &'a str,
    pub records: &'a [EvaluationRecord],
}

/// Remote evaluation sink over HTTP.
pub struct HttpEvaluationSink {
    config: HttpSinkConfig,
    http_client: reqwest::Client,
}

impl HttpEvaluationSink {
    /// Create a new HTTP sink
    pub fn new(config: HttpSinkConfig) -> SinkResult<Self> {
        if config.endpoint.is_empty() {
            return Err(SinkError::InvalidConfig("endpoint is empty".to_string()));
        }
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("evalloop-sink/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(HttpEvaluationSink {
            config,
            http_client,
        })
    }

    /// Create sink from environment variables
    pub fn from_env() -> SinkResult<Self> {
        let config = HttpSinkConfig::from_env()
            .ok_or_else(|| SinkError::Unavailable(format!("{SINK_URL_ENV} not set")))?;
        Self::new(config)
    }

    pub fn config(&self) -> &HttpSinkConfig {
        &self.config
    }
}

#[async_trait]
impl EvaluationSink for HttpEvaluationSink {
    async fn submit_batch(
        &self,
        context: &ExecutionContext,
        records: &[EvaluationRecord],
    ) -> SinkResult<()> {
        let payload = BatchPayload {
            context_ref: context.key(),
            trace_ref: &context.trace_ref,
            unit_ref: &context.unit_ref,
            records,
        };

        let mut request = self.http_client.post(self.config.batch_url()).json(&payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(
                context = %context,
                records = records.len(),
                "evaluation batch accepted"
            );
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

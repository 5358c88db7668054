use std::env;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::normalize::ImagePayload;
use crate::retry::{self, Outcome, RetryPolicy};

pub const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/google/vit-base-patch16-224";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// One label/score pair from the remote classifier. The array order is the
/// remote service's ranking and is preserved as-is.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier credential is not configured")]
    MissingCredential,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("AI service request failed: {status} - {body}")]
    RequestFailed { status: StatusCode, body: String },
    #[error("AI service still failing after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: String },
    #[error("invalid JSON from AI service: {0}")]
    MalformedResponse(String),
    #[error("unexpected AI service response shape: expected an array of predictions")]
    UnexpectedShape,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_url: String,
    /// Bearer credential. Its absence is surfaced per-request, not at startup.
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        let mut retry = RetryPolicy::default();
        if let Some(max_attempts) = env::var("CLASSIFIER_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            retry.max_attempts = max_attempts;
        }

        Self {
            api_url: env::var("CLASSIFIER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_token: env::var("HUGGINGFACE_API_KEY").ok().filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(
                env::var("CLASSIFIER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            retry,
        }
    }
}

/// HTTP client for the remote image classifier.
#[derive(Clone)]
pub struct ClassifierClient {
    http: Client,
    config: ClassifierConfig,
}

impl ClassifierClient {
    pub fn new(http: Client, config: ClassifierConfig) -> Self {
        Self { http, config }
    }

    /// Sends the normalized payload to the remote classifier, retrying
    /// transient failures, and returns the raw prediction array.
    pub async fn classify(&self, payload: &ImagePayload) -> Result<Vec<Prediction>, ClassifyError> {
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or(ClassifyError::MissingCredential)?;
        let body = json!({ "inputs": { "image": BASE64.encode(&payload.bytes) } });

        let outcome = retry::run(
            &self.config.retry,
            || async {
                self.http
                    .post(&self.config.api_url)
                    .bearer_auth(token)
                    .json(&body)
                    .timeout(self.config.timeout)
                    .send()
                    .await
            },
            |result| match result {
                Ok(response) => retry::is_transient_status(response.status().as_u16()),
                Err(_) => true,
            },
        )
        .await;

        let response = match outcome {
            Outcome::Completed(Ok(response)) => response,
            Outcome::Completed(Err(e)) => return Err(ClassifyError::Network(e)),
            Outcome::Exhausted { attempts, last } => {
                let last = match last {
                    Ok(response) => format!("status {}", response.status()),
                    Err(e) => e.to_string(),
                };
                return Err(ClassifyError::RetryExhausted { attempts, last });
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::RequestFailed { status, body });
        }

        let text = response.text().await?;
        parse_predictions(&text)
    }

    /// Single best-effort probe of the remote classifier, used to nudge a
    /// cold-started model. Never retried; callers are expected to ignore
    /// failures.
    pub async fn wake(&self) -> Result<serde_json::Value, ClassifyError> {
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or(ClassifyError::MissingCredential)?;

        let response = self
            .http
            .get(&self.config.api_url)
            .bearer_auth(token)
            .timeout(self.config.timeout)
            .send()
            .await?;

        debug!("wake-up call returned {}", response.status());
        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "text": text })))
    }
}

fn parse_predictions(body: &str) -> Result<Vec<Prediction>, ClassifyError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;
    if !value.is_array() {
        return Err(ClassifyError::UnexpectedShape);
    }
    serde_json::from_value(value).map_err(|_| ClassifyError::UnexpectedShape)
}

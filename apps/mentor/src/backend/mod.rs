//! Backend clients: the only place that talks HTTP to the career services.
//!
//! Every call is a single attempt with no retries and no caching. Callers
//! decide how a failure is surfaced.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::extract;
use crate::models::profile::{ProfileBundle, ValidatedProfileLinks};
use crate::models::resume::{ResumeFields, ResumeUpload};

pub mod client;
pub mod jobs;
pub mod parser;
#[cfg(test)]
pub mod testing;

pub use client::BackendClient;
pub use jobs::JobsClient;
pub use parser::ResumeParserClient;

/// Context tag sent with every chat and suggestion request.
pub const CHAT_CONTEXT: &str = "career_mentor";

/// Header carrying the opaque session id on every backend request.
pub const SESSION_HEADER: &str = "X-Session-Id";

const ERROR_MESSAGE_PATHS: &[&str] = &["/error/message", "/error", "/detail", "/message"];

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// One (user, assistant) exchange sent as suggestion context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryTurn {
    pub user: String,
    pub assistant: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRequest {
    pub bot_message: String,
    pub context: String,
    pub conversation_history: Vec<HistoryTurn>,
}

/// Everything the conversation flow needs from the outside world.
///
/// Production uses [`MentorBackend`]; tests swap in a scripted fake.
#[async_trait]
pub trait CareerBackend: Send + Sync {
    /// Raw `/chat` response; the reply text is located by the caller.
    async fn chat(&self, message: &str) -> Result<Value, BackendError>;

    async fn suggested_messages(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<String>, BackendError>;

    async fn extract_profiles(
        &self,
        links: &ValidatedProfileLinks,
    ) -> Result<ProfileBundle, BackendError>;

    async fn parse_resume(&self, upload: &ResumeUpload) -> Result<ResumeFields, BackendError>;

    async fn store_resume(&self, resume: &ResumeFields) -> Result<(), BackendError>;

    async fn clear_chats(&self) -> Result<(), BackendError>;
}

/// The main backend plus the separately hosted resume parser.
pub struct MentorBackend {
    client: BackendClient,
    parser: ResumeParserClient,
}

impl MentorBackend {
    pub fn new(client: BackendClient, parser: ResumeParserClient) -> Self {
        Self { client, parser }
    }
}

#[async_trait]
impl CareerBackend for MentorBackend {
    async fn chat(&self, message: &str) -> Result<Value, BackendError> {
        self.client.chat(message).await
    }

    async fn suggested_messages(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<String>, BackendError> {
        self.client.suggested_messages(request).await
    }

    async fn extract_profiles(
        &self,
        links: &ValidatedProfileLinks,
    ) -> Result<ProfileBundle, BackendError> {
        self.client.extract_profiles(links).await
    }

    async fn parse_resume(&self, upload: &ResumeUpload) -> Result<ResumeFields, BackendError> {
        self.parser.upload(upload).await
    }

    async fn store_resume(&self, resume: &ResumeFields) -> Result<(), BackendError> {
        self.client.store_resume(resume).await
    }

    async fn clear_chats(&self) -> Result<(), BackendError> {
        self.client.clear_chats().await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared request plumbing
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mentor/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid base URL '{raw}'"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("Base URL '{raw}' cannot carry a path");
    }
    Ok(url)
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, BackendError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BackendError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Reads a JSON body, turning non-2xx statuses into [`BackendError::Api`] with
/// the backend's own message when it sent one.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| extract::first_str(&v, ERROR_MESSAGE_PATHS).map(str::to_string))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                }
            });
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(BackendError::Parse)
}

/// For calls whose body is not needed: any 2xx succeeds, even when empty.
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<(), BackendError> {
    if response.status().is_success() {
        return Ok(());
    }
    // Non-2xx: read_json turns the body into an Api error.
    read_json(response).await.map(|_| ())
}

/// Envelope check for `{success, data, error?}` responses. A missing `success`
/// field counts as success.
pub(crate) fn ensure_success(value: &Value, fallback: &str) -> Result<(), BackendError> {
    match value.get("success").and_then(Value::as_bool) {
        Some(false) => Err(BackendError::Rejected(
            extract::first_str(value, &["/error", "/message"])
                .unwrap_or(fallback)
                .to_string(),
        )),
        _ => Ok(()),
    }
}

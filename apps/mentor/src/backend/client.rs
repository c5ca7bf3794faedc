use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use tracing::debug;

use crate::backend::{
    build_http_client, endpoint, ensure_success, expect_success, parse_base_url, read_json,
    BackendError,
    SuggestionRequest, CHAT_CONTEXT, SESSION_HEADER,
};
use crate::models::profile::{ProfileBundle, ValidatedProfileLinks};
use crate::models::resume::ResumeFields;
use crate::session::SessionIdentity;

/// Client for the main career backend (chat, suggestions, profile extraction,
/// resume persistence, history, user sync).
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
    identity: Arc<SessionIdentity>,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        identity: Arc<SessionIdentity>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: parse_base_url(base_url)?,
            identity,
        })
    }

    fn tagged(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(SESSION_HEADER, &self.identity.session_id)
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder, BackendError> {
        Ok(self.tagged(self.http.post(endpoint(&self.base_url, segments)?)))
    }

    /// POST /chat
    pub async fn chat(&self, message: &str) -> Result<Value, BackendError> {
        let body = json!({
            "message": message,
            "user_email": self.identity.user_key(),
            "context": CHAT_CONTEXT,
        });
        let response = self.post(&["chat"])?.json(&body).send().await?;
        read_json(response).await
    }

    /// POST /suggested-messages
    pub async fn suggested_messages(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<String>, BackendError> {
        let response = self
            .post(&["suggested-messages"])?
            .json(request)
            .send()
            .await?;
        let value = read_json(response).await?;
        ensure_success(&value, "Failed to fetch suggestions")?;

        let suggestions = value
            .pointer("/data/suggested_messages")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(suggestions)
    }

    /// POST /extract. The response body is returned verbatim as the bundle.
    pub async fn extract_profiles(
        &self,
        links: &ValidatedProfileLinks,
    ) -> Result<ProfileBundle, BackendError> {
        let response = self.post(&["extract"])?.json(links).send().await?;
        let value = read_json(response).await?;
        let status = value
            .get("database_status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        debug!("Profile extraction finished: status={status}");
        Ok(ProfileBundle(value))
    }

    /// POST /resume-data
    pub async fn store_resume(&self, resume: &ResumeFields) -> Result<(), BackendError> {
        let body = json!({
            "user_email": self.identity.user_key(),
            "resume_data": resume,
        });
        let response = self.post(&["resume-data"])?.json(&body).send().await?;
        expect_success(response).await
    }

    /// DELETE /chats/{user_email}
    pub async fn clear_chats(&self) -> Result<(), BackendError> {
        let url = endpoint(&self.base_url, &["chats", self.identity.user_key()])?;
        let response = self.tagged(self.http.delete(url)).send().await?;
        expect_success(response).await
    }

    /// POST /users/upsert. No-op when no authenticated email is configured.
    pub async fn upsert_user(&self) -> Result<(), BackendError> {
        let Some(email) = self.identity.email.as_deref() else {
            return Ok(());
        };
        let username = self
            .identity
            .username
            .clone()
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
        let body = json!({ "email": email, "username": username });
        let response = self.post(&["users", "upsert"])?.json(&body).send().await?;
        expect_success(response).await
    }
}

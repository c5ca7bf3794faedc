//! Test doubles for the backend seam.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::backend::{BackendError, CareerBackend, SuggestionRequest};
use crate::models::profile::{ProfileBundle, ValidatedProfileLinks};
use crate::models::resume::{ResumeFields, ResumeUpload};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn unavailable() -> BackendError {
    BackendError::Api {
        status: 503,
        message: "backend unavailable".to_string(),
    }
}

/// Scripted [`CareerBackend`]. `None` responses fail with a 503.
pub struct FakeBackend {
    pub chat_response: Option<Value>,
    pub suggestions: Option<Vec<String>>,
    pub extract_response: Option<Value>,
    pub resume_response: Option<Value>,
    pub store_resume_ok: bool,
    pub clear_ok: bool,
    /// When set, `chat` waits for a notification before answering.
    pub chat_gate: Option<Arc<Notify>>,
    /// When set, each suggestion fetch waits for its own notification.
    pub suggestions_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<String>>,
    last_suggestion_request: Mutex<Option<SuggestionRequest>>,
}

impl FakeBackend {
    pub fn healthy() -> Self {
        Self {
            chat_response: Some(json!({ "response": "Focus on systems programming." })),
            suggestions: Some(vec![
                "Show me a roadmap".to_string(),
                "Which jobs fit me?".to_string(),
            ]),
            extract_response: Some(json!({
                "database_status": "stored",
                "github_repos": [
                    { "name": "rusty", "language": "Rust", "stargazers_count": 5, "forks_count": 1 }
                ],
                "codechef": { "handle": "alice", "rating": 1650 }
            })),
            resume_response: Some(json!({
                "Full Name": "Alice Doe",
                "Email": "alice@example.com",
                "Skills": ["Rust", "SQL"]
            })),
            store_resume_ok: true,
            clear_ok: true,
            chat_gate: None,
            suggestions_gate: None,
            calls: Mutex::new(Vec::new()),
            last_suggestion_request: Mutex::new(None),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn last_suggestion_request(&self) -> Option<SuggestionRequest> {
        self.last_suggestion_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CareerBackend for FakeBackend {
    async fn chat(&self, _message: &str) -> Result<Value, BackendError> {
        self.record("chat");
        if let Some(gate) = &self.chat_gate {
            gate.notified().await;
        }
        self.chat_response.clone().ok_or_else(unavailable)
    }

    async fn suggested_messages(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<String>, BackendError> {
        self.record("suggestions");
        *self.last_suggestion_request.lock().unwrap() = Some(request.clone());
        if let Some(gate) = &self.suggestions_gate {
            gate.notified().await;
        }
        self.suggestions.clone().ok_or_else(unavailable)
    }

    async fn extract_profiles(
        &self,
        _links: &ValidatedProfileLinks,
    ) -> Result<ProfileBundle, BackendError> {
        self.record("extract");
        self.extract_response
            .clone()
            .map(ProfileBundle)
            .ok_or_else(unavailable)
    }

    async fn parse_resume(&self, _upload: &ResumeUpload) -> Result<ResumeFields, BackendError> {
        self.record("parse_resume");
        self.resume_response
            .clone()
            .map(ResumeFields)
            .ok_or_else(unavailable)
    }

    async fn store_resume(&self, _resume: &ResumeFields) -> Result<(), BackendError> {
        self.record("store_resume");
        if self.store_resume_ok {
            Ok(())
        } else {
            Err(unavailable())
        }
    }

    async fn clear_chats(&self) -> Result<(), BackendError> {
        self.record("clear_chats");
        if self.clear_ok {
            Ok(())
        } else {
            Err(unavailable())
        }
    }
}

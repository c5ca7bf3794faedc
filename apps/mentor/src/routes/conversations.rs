use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::conversation::Conversation;
use crate::models::profile::ProfileLinks;
use crate::models::resume::ResumeUpload;
use crate::state::AppState;
use crate::views::{ConversationList, ConversationView};

/// Multipart field carrying the resume file.
const RESUME_FIELD: &str = "file";

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

fn view(state: &AppState, conversation: &Conversation) -> ConversationView {
    ConversationView::new(conversation, &state.orchestrator.active_id())
}

/// GET /api/v1/conversations
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<ConversationList> {
    let active_id = state.orchestrator.active_id();
    let conversations = state
        .orchestrator
        .search(params.q.as_deref().unwrap_or_default());
    Json(ConversationList::new(&conversations, &active_id))
}

/// POST /api/v1/conversations
pub async fn handle_new_chat(
    State(state): State<AppState>,
) -> (StatusCode, Json<ConversationView>) {
    let conversation = state.orchestrator.new_chat();
    (StatusCode::CREATED, Json(view(&state, &conversation)))
}

/// DELETE /api/v1/conversations
pub async fn handle_clear_all(
    State(state): State<AppState>,
) -> Result<Json<ConversationList>, AppError> {
    let snapshot = state.orchestrator.clear_all().await?;
    Ok(Json(ConversationList::from(&snapshot)))
}

/// GET /api/v1/conversations/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationView>, AppError> {
    let conversation = state.orchestrator.conversation(&id)?;
    Ok(Json(view(&state, &conversation)))
}

/// PATCH /api/v1/conversations/:id
pub async fn handle_rename(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<ConversationView>, AppError> {
    let conversation = state.orchestrator.rename(&id, &req.title)?;
    Ok(Json(view(&state, &conversation)))
}

/// DELETE /api/v1/conversations/:id
/// Returns the remaining list so the client learns the new active id.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationList>, AppError> {
    state.orchestrator.delete(&id)?;
    Ok(Json(ConversationList::from(&state.orchestrator.snapshot())))
}

/// POST /api/v1/conversations/:id/select
pub async fn handle_select(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationView>, AppError> {
    state.orchestrator.select(&id)?;
    let conversation = state.orchestrator.conversation(&id)?;
    Ok(Json(view(&state, &conversation)))
}

/// POST /api/v1/conversations/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ConversationView>, AppError> {
    let conversation = state.orchestrator.send_message(&id, &req.text).await?;
    Ok(Json(view(&state, &conversation)))
}

/// POST /api/v1/conversations/:id/profiles
pub async fn handle_submit_profiles(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(links): Json<ProfileLinks>,
) -> Result<Json<ConversationView>, AppError> {
    let conversation = state.orchestrator.submit_profiles(&id, links).await?;
    Ok(Json(view(&state, &conversation)))
}

/// POST /api/v1/conversations/:id/resume
/// Multipart form with the resume in field `file`.
pub async fn handle_submit_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ConversationView>, AppError> {
    let upload = read_resume_field(multipart).await?;
    let conversation = state.orchestrator.submit_resume(&id, upload).await?;
    Ok(Json(view(&state, &conversation)))
}

async fn read_resume_field(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read resume upload: {e}")))?;
        return Ok(ResumeUpload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation(format!(
        "Missing multipart field '{RESUME_FIELD}'"
    )))
}

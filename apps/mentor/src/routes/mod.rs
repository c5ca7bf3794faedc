pub mod conversations;
pub mod health;
pub mod jobs;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Upper bound for a resume upload request body.
const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", get(session::handle_get_session))
        // Conversations
        .route(
            "/api/v1/conversations",
            get(conversations::handle_list)
                .post(conversations::handle_new_chat)
                .delete(conversations::handle_clear_all),
        )
        .route(
            "/api/v1/conversations/:id",
            get(conversations::handle_get)
                .patch(conversations::handle_rename)
                .delete(conversations::handle_delete),
        )
        .route(
            "/api/v1/conversations/:id/select",
            post(conversations::handle_select),
        )
        .route(
            "/api/v1/conversations/:id/messages",
            post(conversations::handle_send_message),
        )
        .route(
            "/api/v1/conversations/:id/profiles",
            post(conversations::handle_submit_profiles),
        )
        .route(
            "/api/v1/conversations/:id/resume",
            post(conversations::handle_submit_resume)
                .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES)),
        )
        // Jobs
        .route("/api/v1/jobs", get(jobs::handle_recent_jobs))
        .route("/api/v1/jobs/roadmap", post(jobs::handle_roadmap))
        .with_state(state)
}

use axum::{extract::State, Json};

use crate::state::AppState;
use crate::views::SessionView;

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView::from(state.identity.as_ref()))
}

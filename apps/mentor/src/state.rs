use std::sync::Arc;

use crate::backend::JobsClient;
use crate::orchestrator::Orchestrator;
use crate::session::SessionIdentity;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub jobs: JobsClient,
    /// Created once at startup; the only session identity in the process.
    pub identity: Arc<SessionIdentity>,
}

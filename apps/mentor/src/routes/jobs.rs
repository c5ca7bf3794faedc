use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::{Job, Roadmap, RoadmapQuery};
use crate::state::AppState;
use crate::views::JobCard;

const DEFAULT_LIMIT: u32 = 6;
const MAX_LIMIT: u32 = 50;

#[derive(Deserialize)]
pub struct JobsQuery {
    pub limit: Option<u32>,
}

/// GET /api/v1/jobs
pub async fn handle_recent_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsQuery>,
) -> Result<Json<Vec<JobCard>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    let jobs = state.jobs.recent(limit).await?;
    Ok(Json(jobs.into_iter().map(JobCard::from).collect()))
}

/// POST /api/v1/jobs/roadmap
/// Body is a job listing as returned by the jobs endpoint.
pub async fn handle_roadmap(
    State(state): State<AppState>,
    Json(job): Json<Job>,
) -> Result<Json<Roadmap>, AppError> {
    if job.title.trim().is_empty() {
        return Err(AppError::Validation("Job title is required".to_string()));
    }
    let roadmap = state.jobs.roadmap(&RoadmapQuery::from(&job)).await?;
    Ok(Json(roadmap))
}

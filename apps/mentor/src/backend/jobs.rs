use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::{
    build_http_client, endpoint, ensure_success, parse_base_url, read_json, BackendError,
};
use crate::models::job::{Job, Roadmap, RoadmapQuery};

/// Client for the job listing and roadmap endpoints of the career backend.
#[derive(Clone)]
pub struct JobsClient {
    http: Client,
    base_url: Url,
}

impl JobsClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// GET /jobprofiles/recent?limit=N
    pub async fn recent(&self, limit: u32) -> Result<Vec<Job>, BackendError> {
        let url = endpoint(&self.base_url, &["jobprofiles", "recent"])?;
        let response = self
            .http
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await?;
        let value = read_json(response).await?;
        ensure_success(&value, "Failed to fetch jobs")?;

        let profiles = value
            .pointer("/data/profiles")
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        let jobs: Vec<Job> = serde_json::from_value(profiles)?;
        info!("Fetched {} recent job profiles", jobs.len());
        Ok(jobs)
    }

    /// GET /jobprofiles/roadmap/image
    pub async fn roadmap(&self, query: &RoadmapQuery) -> Result<Roadmap, BackendError> {
        let url = endpoint(&self.base_url, &["jobprofiles", "roadmap", "image"])?;
        debug!("Requesting roadmap for '{}'", query.job_title);
        let response = self.http.get(url).query(query).send().await?;
        let value = read_json(response).await?;
        ensure_success(&value, "Failed to generate roadmap")?;

        let roadmap = match value.get("data") {
            Some(data) if !data.is_null() => serde_json::from_value(data.clone())?,
            _ => Roadmap::default(),
        };
        Ok(roadmap)
    }
}

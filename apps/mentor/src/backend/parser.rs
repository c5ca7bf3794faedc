use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use tracing::info;

use crate::backend::{
    build_http_client, endpoint, ensure_success, parse_base_url, read_json, BackendError,
};
use crate::models::resume::{ResumeFields, ResumeUpload};

const UPLOAD_ENDPOINT: &str = "upload";

/// Client for the separately hosted resume parser service.
#[derive(Clone)]
pub struct ResumeParserClient {
    http: Client,
    base_url: Url,
}

impl ResumeParserClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// POST /upload (multipart, field `file`), returns `resume_data` verbatim.
    pub async fn upload(&self, upload: &ResumeUpload) -> Result<ResumeFields, BackendError> {
        let mime = upload.mime_type().unwrap_or("application/octet-stream");

        let form = Form::new().part(
            "file",
            Part::bytes(upload.bytes.to_vec())
                .file_name(upload.file_name.clone())
                .mime_str(mime)?,
        );

        let url = endpoint(&self.base_url, &[UPLOAD_ENDPOINT])?;
        info!("Calling resume parser: {} ({} bytes)", url, upload.bytes.len());

        let response = self.http.post(url).multipart(form).send().await?;
        let value = read_json(response).await?;
        ensure_success(&value, "Failed to analyze resume")?;

        match value.get("resume_data") {
            Some(data) if !data.is_null() => Ok(ResumeFields(data.clone())),
            _ => Err(BackendError::Rejected(
                "Resume parser returned no resume data".to_string(),
            )),
        }
    }
}

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Parsed resume as returned by the parser service, kept verbatim.
/// Key spelling varies between parser versions and the payload may be a raw
/// (possibly fenced) JSON string; see `views::resume_display` for lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeFields(pub Value);

const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("txt", "text/plain"),
];

/// A resume file received from the user, ready to forward to the parser.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ResumeUpload {
    /// MIME type of an accepted format, recognised by file extension first and
    /// declared content type second.
    pub fn mime_type(&self) -> Option<&'static str> {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        let by_extension = ACCEPTED_TYPES
            .iter()
            .find(|(ext, _)| extension.as_deref() == Some(*ext));
        let by_content_type = ACCEPTED_TYPES.iter().find(|(_, mime)| {
            self.content_type
                .as_deref()
                .and_then(|ct| ct.split(';').next())
                .map(|ct| ct.trim().eq_ignore_ascii_case(mime))
                .unwrap_or(false)
        });

        by_extension.or(by_content_type).map(|(_, mime)| *mime)
    }

    /// Accepts non-empty PDF, DOCX and TXT files. Returns the MIME type to forward.
    pub fn validate(&self) -> Result<&'static str, AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::Validation("Resume file is empty".to_string()));
        }
        self.mime_type().ok_or_else(|| {
            AppError::Validation("Please upload a PDF, DOCX, or TXT file".to_string())
        })
    }
}

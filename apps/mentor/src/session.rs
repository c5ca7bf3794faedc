//! Session identity: the opaque id that tags every backend call.
//!
//! Created exactly once at startup by [`SessionIdentity::load_or_create`] and
//! shared as `Arc<SessionIdentity>` with everything that talks to the backend.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    session_id: String,
    created_at: DateTime<Utc>,
}

impl SessionIdentity {
    /// Reads the session id from `path`, or generates one and writes it there.
    /// An unreadable or corrupt file is replaced with a fresh id.
    pub fn load_or_create(
        path: &Path,
        email: Option<String>,
        username: Option<String>,
    ) -> Result<Self> {
        let existing = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<SessionFile>(&raw) {
                Ok(file) if !file.session_id.trim().is_empty() => {
                    debug!("Reusing session created at {}", file.created_at);
                    Some(file.session_id)
                }
                Ok(_) => None,
                Err(e) => {
                    warn!("Session file {} is corrupt, regenerating: {e}", path.display());
                    None
                }
            },
            Err(_) => None,
        };

        let session_id = match existing {
            Some(id) => id,
            None => {
                let file = SessionFile {
                    session_id: format!("session-{}", Uuid::new_v4()),
                    created_at: Utc::now(),
                };
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create session directory {}", parent.display())
                    })?;
                }
                fs::write(path, serde_json::to_vec_pretty(&file)?)
                    .with_context(|| format!("Failed to write session file {}", path.display()))?;
                info!("Generated new session id");
                file.session_id
            }
        };

        Ok(Self {
            session_id,
            email,
            username,
        })
    }

    /// The key the backend stores per-user data under: the linked email when
    /// one is configured, otherwise the opaque session id.
    pub fn user_key(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.session_id)
    }

    #[cfg(test)]
    pub fn for_tests(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            email: None,
            username: None,
        }
    }
}

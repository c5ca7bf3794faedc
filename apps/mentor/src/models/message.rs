use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::ProfileBundle;
use crate::models::resume::ResumeFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single chat message. Never edited after it is appended; attachments are
/// set at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_data: Option<ProfileBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_data: Option<ResumeFields>,
}

impl Message {
    pub fn new(id: String, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            profile_data: None,
            resume_data: None,
        }
    }

    pub fn user(id: String, text: impl Into<String>) -> Self {
        Self::new(id, Sender::User, text)
    }

    pub fn assistant(id: String, text: impl Into<String>) -> Self {
        Self::new(id, Sender::Assistant, text)
    }

    pub fn with_profile(mut self, profile: ProfileBundle) -> Self {
        self.profile_data = Some(profile);
        self
    }

    pub fn with_resume(mut self, resume: ResumeFields) -> Self {
        self.resume_data = Some(resume);
        self
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serializes_camel_case_and_omits_empty_attachments() {
        let message = Message::assistant("1-0".to_string(), "hello");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sender"], "assistant");
        assert!(value.get("profileData").is_none());
        assert!(value.get("resumeData").is_none());
    }

    #[test]
    fn test_profile_attachment_round_trips() {
        let bundle = ProfileBundle(json!({ "github_repos": [{ "name": "rusty" }] }));
        let message = Message::assistant("1-1".to_string(), "profiles").with_profile(bundle.clone());
        let raw = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.profile_data, Some(bundle));
    }
}

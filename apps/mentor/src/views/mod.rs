//! Render-ready view models. Pure functions of orchestrator state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::conversation::{Conversation, Stage};
use crate::models::message::{Message, Sender};
use crate::models::profile::ProfileBundle;
use crate::models::resume::ResumeFields;
use crate::orchestrator::StoreSnapshot;
use crate::session::SessionIdentity;

pub mod job_card;
pub mod profile_card;
pub mod resume_display;

pub use job_card::JobCard;
pub use profile_card::ProfileCards;
pub use resume_display::ResumeDisplay;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Clock time shown next to the bubble, `HH:MM`.
    pub time_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_data: Option<ProfileBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_cards: Option<ProfileCards>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_data: Option<ResumeFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeDisplay>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            text: message.text.clone(),
            sender: message.sender,
            timestamp: message.timestamp,
            time_label: message.timestamp.format("%H:%M").to_string(),
            profile_data: message.profile_data.clone(),
            profile_cards: message.profile_data.as_ref().map(ProfileCards::from_bundle),
            resume_data: message.resume_data.clone(),
            resume: message.resume_data.as_ref().map(ResumeDisplay::from_fields),
        }
    }
}

/// Everything needed to render one conversation pane.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: String,
    pub stage: Stage,
    pub active: bool,
    pub typing: bool,
    pub profile_prompt_open: bool,
    pub resume_prompt_open: bool,
    pub suggestions: Vec<String>,
    pub suggestions_loading: bool,
    /// Job recommendations follow directly after an analysed resume.
    pub show_jobs: bool,
    pub messages: Vec<MessageView>,
}

impl ConversationView {
    pub fn new(conversation: &Conversation, active_id: &str) -> Self {
        let show_jobs = conversation
            .last_message()
            .map(|m| !m.is_user() && m.resume_data.is_some())
            .unwrap_or(false);

        Self {
            id: conversation.id.clone(),
            title: conversation.title.clone(),
            last_message: conversation.last_message.clone(),
            timestamp: conversation.timestamp.clone(),
            stage: conversation.stage,
            active: conversation.id == active_id,
            typing: conversation.ui.typing(),
            profile_prompt_open: conversation.ui.profile_prompt_open,
            resume_prompt_open: conversation.ui.resume_prompt_open,
            suggestions: conversation.ui.suggestions.clone(),
            suggestions_loading: conversation.ui.suggestions_loading,
            show_jobs,
            messages: conversation.messages.iter().map(MessageView::from).collect(),
        }
    }
}

/// Sidebar entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: String,
    pub stage: Stage,
    pub active: bool,
}

impl ConversationSummary {
    pub fn new(conversation: &Conversation, active_id: &str) -> Self {
        Self {
            id: conversation.id.clone(),
            title: conversation.title.clone(),
            last_message: conversation.last_message.clone(),
            timestamp: conversation.timestamp.clone(),
            stage: conversation.stage,
            active: conversation.id == active_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationList {
    pub active_id: String,
    pub conversations: Vec<ConversationSummary>,
}

impl ConversationList {
    pub fn new<'a>(conversations: impl IntoIterator<Item = &'a Conversation>, active_id: &str) -> Self {
        Self {
            active_id: active_id.to_string(),
            conversations: conversations
                .into_iter()
                .map(|c| ConversationSummary::new(c, active_id))
                .collect(),
        }
    }
}

impl From<&StoreSnapshot> for ConversationList {
    fn from(snapshot: &StoreSnapshot) -> Self {
        Self::new(&snapshot.conversations, &snapshot.active_id)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub user_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl From<&SessionIdentity> for SessionView {
    fn from(identity: &SessionIdentity) -> Self {
        Self {
            session_id: identity.session_id.clone(),
            user_key: identity.user_key().to_string(),
            email: identity.email.clone(),
            username: identity.username.clone(),
        }
    }
}

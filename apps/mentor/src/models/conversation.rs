use serde::{Deserialize, Serialize};

use crate::models::message::{Message, Sender};

pub const DEFAULT_TITLE: &str = "New Conversation";
pub const JUST_NOW: &str = "Just now";

const TITLE_MAX_CHARS: usize = 40;
const PREVIEW_MAX_CHARS: usize = 50;

/// Where a conversation is in the onboarding flow.
/// Profiles are collected first, then the resume, then chat is open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Fresh,
    AwaitingProfiles,
    AwaitingResume,
    OpenChat,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fresh => "fresh",
            Stage::AwaitingProfiles => "awaiting_profiles",
            Stage::AwaitingResume => "awaiting_resume",
            Stage::OpenChat => "open_chat",
        }
    }
}

/// Transient per-conversation UI flags. Not archived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Requests in flight that will end in an assistant message.
    pub pending_replies: u32,
    pub profile_prompt_open: bool,
    pub resume_prompt_open: bool,
    pub suggestions: Vec<String>,
    pub suggestions_loading: bool,
    /// Bumped whenever suggestions are requested or cleared; a fetch result
    /// is applied only if the turn it was started for is still current.
    pub suggestion_turn: u64,
}

impl UiState {
    /// Flags implied by a stage, used when a conversation is restored from the archive.
    pub fn for_stage(stage: Stage) -> Self {
        Self {
            profile_prompt_open: stage == Stage::AwaitingProfiles,
            resume_prompt_open: stage == Stage::AwaitingResume,
            ..Self::default()
        }
    }

    pub fn typing(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn begin_request(&mut self) {
        self.pending_replies += 1;
    }

    pub fn finish_request(&mut self) {
        self.pending_replies = self.pending_replies.saturating_sub(1);
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestions_loading = false;
        self.suggestion_turn += 1;
    }

    /// Marks a suggestion fetch as started and returns its turn number.
    pub fn start_suggestions(&mut self) -> u64 {
        self.suggestion_turn += 1;
        self.suggestions_loading = true;
        self.suggestion_turn
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub stage: Stage,
    #[serde(skip)]
    pub ui: UiState,
}

impl Conversation {
    pub fn new(id: String) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            last_message: String::new(),
            timestamp: JUST_NOW.to_string(),
            messages: Vec::new(),
            stage: Stage::Fresh,
            ui: UiState::default(),
        }
    }

    /// Appends a message at the end and refreshes the title and preview.
    /// The title is taken from the first user message unless it was renamed earlier.
    pub fn push(&mut self, message: Message) {
        match message.sender {
            Sender::User => {
                let first_user_message = !self.messages.iter().any(Message::is_user);
                if first_user_message && self.title == DEFAULT_TITLE {
                    self.title = derive_title(&message.text);
                }
                self.last_message = message.text.clone();
            }
            Sender::Assistant => {
                self.last_message = preview(&message.text);
            }
        }
        self.timestamp = JUST_NOW.to_string();
        self.messages.push(message);
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

fn derive_title(text: &str) -> String {
    let title: String = text.trim().chars().take(TITLE_MAX_CHARS).collect();
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_MAX_CHARS {
        let cut: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> Message {
        Message::user("u".to_string(), text)
    }

    #[test]
    fn test_title_comes_from_first_user_message_and_stays() {
        let mut conv = Conversation::new("c1".to_string());
        conv.push(user("   Help me become a backend engineer at a startup please   "));
        assert_eq!(conv.title, "Help me become a backend engineer at a s");
        assert_eq!(conv.title.chars().count(), 40);

        conv.push(user("something else"));
        assert_eq!(conv.title, "Help me become a backend engineer at a s");
    }

    #[test]
    fn test_renamed_title_survives_first_message() {
        let mut conv = Conversation::new("c1".to_string());
        conv.title = "Interview prep".to_string();
        conv.push(user("hey guide me"));
        assert_eq!(conv.title, "Interview prep");
    }

    #[test]
    fn test_assistant_preview_is_truncated() {
        let mut conv = Conversation::new("c1".to_string());
        conv.push(Message::assistant("a".to_string(), "x".repeat(80)));
        assert_eq!(conv.last_message, format!("{}...", "x".repeat(50)));

        conv.push(Message::assistant("b".to_string(), "short"));
        assert_eq!(conv.last_message, "short");
    }

    #[test]
    fn test_messages_keep_insertion_order() {
        let mut conv = Conversation::new("c1".to_string());
        for i in 0..5 {
            conv.push(Message::user(i.to_string(), format!("m{i}")));
        }
        let ids: Vec<_> = conv.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_ui_flags_restored_from_stage() {
        assert!(UiState::for_stage(Stage::AwaitingProfiles).profile_prompt_open);
        assert!(UiState::for_stage(Stage::AwaitingResume).resume_prompt_open);
        assert_eq!(UiState::for_stage(Stage::OpenChat), UiState::default());
    }

    #[test]
    fn test_clearing_suggestions_invalidates_pending_turn() {
        let mut ui = UiState::default();
        let turn = ui.start_suggestions();
        ui.clear_suggestions();
        assert_ne!(ui.suggestion_turn, turn);
        assert!(!ui.suggestions_loading);
    }

    #[test]
    fn test_stage_serde_snake_case() {
        let raw = serde_json::to_string(&Stage::AwaitingProfiles).unwrap();
        assert_eq!(raw, "\"awaiting_profiles\"");
        assert_eq!(Stage::OpenChat.as_str(), "open_chat");
    }
}

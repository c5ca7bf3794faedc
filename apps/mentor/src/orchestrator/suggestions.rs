use std::collections::HashSet;

use crate::backend::{HistoryTurn, SuggestionRequest, CHAT_CONTEXT};
use crate::models::message::{Message, Sender};

/// Turns of (user, assistant) history sent with a suggestion request.
pub const HISTORY_TURNS: usize = 6;
pub const MAX_SUGGESTIONS: usize = 6;

/// Pairs each user message with the assistant message that answered it and
/// keeps the most recent `limit` pairs in chronological order.
pub fn recent_history(messages: &[Message], limit: usize) -> Vec<HistoryTurn> {
    let mut turns = Vec::new();
    let mut pending_user: Option<&str> = None;

    for message in messages {
        match message.sender {
            Sender::User => pending_user = Some(&message.text),
            Sender::Assistant => {
                if let Some(user) = pending_user.take() {
                    turns.push(HistoryTurn {
                        user: user.to_string(),
                        assistant: message.text.clone(),
                    });
                }
            }
        }
    }

    let skip = turns.len().saturating_sub(limit);
    turns.split_off(skip)
}

/// Builds the request for the latest assistant message, if there is one.
pub fn build_request(messages: &[Message]) -> Option<SuggestionRequest> {
    let bot_message = messages.iter().rev().find(|m| !m.is_user())?;
    Some(SuggestionRequest {
        bot_message: bot_message.text.clone(),
        context: CHAT_CONTEXT.to_string(),
        conversation_history: recent_history(messages, HISTORY_TURNS),
    })
}

/// Trims, drops blanks and duplicates (first occurrence wins), caps the list.
pub fn normalize(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .take(MAX_SUGGESTIONS)
        .collect()
}

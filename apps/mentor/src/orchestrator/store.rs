use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::conversation::{Conversation, UiState};

/// Serializable picture of the whole conversation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub conversations: Vec<Conversation>,
    pub active_id: String,
}

/// The ordered conversation set plus the active pointer.
///
/// Never empty, and `active_id` always names a conversation in the set. Every
/// mutating method re-establishes both before returning.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: String,
    seq: u64,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// A store holding a single seed conversation.
    pub fn new() -> Self {
        let mut store = Self {
            conversations: Vec::new(),
            active_id: String::new(),
            seq: 0,
        };
        store.seed();
        store
    }

    /// Rebuilds a store from an archived snapshot, repairing anything that
    /// would break the invariants.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self {
            conversations: snapshot.conversations,
            active_id: snapshot.active_id,
            seq: 0,
        };
        for conversation in &mut store.conversations {
            conversation.ui = UiState::for_stage(conversation.stage);
        }
        store.repair();
        store
    }

    /// Timestamp-based id, unique within the process.
    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format!("{}-{}", Utc::now().timestamp_millis(), self.seq)
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Looks up a conversation or fails with a 404-style error.
    pub fn require_mut(&mut self, id: &str) -> Result<&mut Conversation, AppError> {
        self.get_mut(id)
            .ok_or_else(|| AppError::conversation_not_found(id))
    }

    /// Inserts a fresh conversation at the front and makes it active.
    pub fn new_conversation(&mut self) -> &Conversation {
        let id = self.next_id();
        self.conversations.insert(0, Conversation::new(id.clone()));
        self.active_id = id;
        &self.conversations[0]
    }

    pub fn select(&mut self, id: &str) -> Result<(), AppError> {
        if self.get(id).is_none() {
            return Err(AppError::conversation_not_found(id));
        }
        self.active_id = id.to_string();
        Ok(())
    }

    /// Removes a conversation. When it was active, the conversation that moves
    /// into its position becomes active, else the last one, else a new seed.
    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        let index = self
            .conversations
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::conversation_not_found(id))?;
        self.conversations.remove(index);

        if self.active_id == id {
            let next = self
                .conversations
                .get(index)
                .or_else(|| self.conversations.last())
                .map(|c| c.id.clone());
            match next {
                Some(next) => self.active_id = next,
                None => self.seed(),
            }
        }
        Ok(())
    }

    /// Drops every conversation and starts over with one seed.
    pub fn reset(&mut self) {
        self.conversations.clear();
        self.seed();
    }

    /// Case-insensitive title match. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Conversation> {
        let needle = query.trim().to_lowercase();
        self.conversations
            .iter()
            .filter(|c| needle.is_empty() || c.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            conversations: self.conversations.clone(),
            active_id: self.active_id.clone(),
        }
    }

    fn seed(&mut self) {
        self.new_conversation();
    }

    fn repair(&mut self) {
        let mut seen = HashSet::new();
        self.conversations.retain(|c| seen.insert(c.id.clone()));

        if self.conversations.is_empty() {
            self.seed();
        } else if self.get(&self.active_id).is_none() {
            self.active_id = self.conversations[0].id.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation::Stage;
    use crate::models::message::Message;

    fn assert_invariants(store: &ConversationStore) {
        assert!(!store.snapshot().conversations.is_empty());
        assert!(store.get(store.active_id()).is_some());
    }

    #[test]
    fn test_new_store_has_one_active_seed() {
        let store = ConversationStore::new();
        assert_eq!(store.snapshot().conversations.len(), 1);
        assert_invariants(&store);
    }

    #[test]
    fn test_new_chats_are_prepended_and_activated() {
        let mut store = ConversationStore::new();
        for _ in 0..10 {
            let id = store.new_conversation().id.clone();
            assert_eq!(store.active_id(), id);
            assert_eq!(store.snapshot().conversations[0].id, id);
            assert_invariants(&store);
        }
        assert_eq!(store.snapshot().conversations.len(), 11);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = ConversationStore::new();
        let a = store.next_id();
        let b = store.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_delete_active_selects_neighbour_at_same_position() {
        let mut store = ConversationStore::new();
        let oldest = store.active_id().to_string();
        let middle = store.new_conversation().id.clone();
        let newest = store.new_conversation().id.clone();
        // Order is now [newest, middle, oldest].
        store.select(&middle).unwrap();

        store.delete(&middle).unwrap();
        assert_eq!(store.active_id(), oldest);

        store.select(&oldest).unwrap();
        store.delete(&oldest).unwrap();
        assert_eq!(store.active_id(), newest);
        assert_invariants(&store);
    }

    #[test]
    fn test_deleting_last_conversation_seeds_a_new_one() {
        let mut store = ConversationStore::new();
        let only = store.active_id().to_string();
        store.delete(&only).unwrap();

        assert_eq!(store.snapshot().conversations.len(), 1);
        assert_ne!(store.active_id(), only);
        assert_eq!(store.snapshot().conversations[0].stage, Stage::Fresh);
        assert_invariants(&store);
    }

    #[test]
    fn test_delete_inactive_keeps_active_pointer() {
        let mut store = ConversationStore::new();
        let first = store.active_id().to_string();
        let second = store.new_conversation().id.clone();
        store.delete(&first).unwrap();
        assert_eq!(store.active_id(), second);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let mut store = ConversationStore::new();
        assert!(matches!(store.select("nope"), Err(AppError::NotFound(_))));
        assert!(matches!(store.delete("nope"), Err(AppError::NotFound(_))));
        assert_invariants(&store);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title() {
        let mut store = ConversationStore::new();
        let id = store.active_id().to_string();
        store
            .get_mut(&id)
            .unwrap()
            .push(Message::user("m1".to_string(), "Rust backend roles"));
        store.new_conversation();

        assert_eq!(store.search("BACKEND").len(), 1);
        assert_eq!(store.search("  ").len(), 2);
        assert!(store.search("frontend").is_empty());
    }

    #[test]
    fn test_reset_leaves_single_seed() {
        let mut store = ConversationStore::new();
        store.new_conversation();
        store.new_conversation();
        store.reset();
        assert_eq!(store.snapshot().conversations.len(), 1);
        assert_invariants(&store);
    }

    #[test]
    fn test_from_snapshot_repairs_dangling_active_and_restores_flags() {
        let mut conversation = Conversation::new("c1".to_string());
        conversation.stage = Stage::AwaitingResume;
        let store = ConversationStore::from_snapshot(StoreSnapshot {
            conversations: vec![conversation],
            active_id: "gone".to_string(),
        });

        assert_eq!(store.active_id(), "c1");
        assert!(store.snapshot().conversations[0].ui.resume_prompt_open);
    }

    #[test]
    fn test_from_empty_snapshot_seeds() {
        let store = ConversationStore::from_snapshot(StoreSnapshot {
            conversations: Vec::new(),
            active_id: String::new(),
        });
        assert_invariants(&store);
    }
}

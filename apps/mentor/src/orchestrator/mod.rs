//! Conversation orchestration: turns user input into messages and stage changes.
//!
//! Each conversation moves Fresh → AwaitingProfiles → AwaitingResume → OpenChat.
//! Backend calls are awaited without holding the store lock, and every result
//! is applied to the conversation id captured when the request started.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::archive::ArchiveHandle;
use crate::backend::CareerBackend;
use crate::errors::AppError;
use crate::models::conversation::{Conversation, Stage};
use crate::models::message::Message;
use crate::models::profile::{ProfileLinks, ValidatedProfileLinks};
use crate::models::resume::{ResumeFields, ResumeUpload};

pub mod prompts;
pub mod reply;
pub mod store;
pub mod suggestions;

pub use store::{ConversationStore, StoreSnapshot};

#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<Mutex<ConversationStore>>,
    backend: Arc<dyn CareerBackend>,
    resume_prompt_delay: Duration,
    archive: Option<ArchiveHandle>,
}

impl Orchestrator {
    pub fn new(
        store: ConversationStore,
        backend: Arc<dyn CareerBackend>,
        resume_prompt_delay: Duration,
        archive: Option<ArchiveHandle>,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            backend,
            resume_prompt_delay,
            archive,
        }
    }

    fn read<R>(&self, f: impl FnOnce(&ConversationStore) -> R) -> R {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Runs a mutation under the lock and publishes the result to the archive.
    fn with_store<R>(&self, f: impl FnOnce(&mut ConversationStore) -> R) -> R {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut store);
        if let Some(archive) = &self.archive {
            archive.publish(store.snapshot());
        }
        result
    }

    // ────────────────────────────────────────────────────────────────────────
    // Conversation list
    // ────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> StoreSnapshot {
        self.read(ConversationStore::snapshot)
    }

    pub fn conversation(&self, id: &str) -> Result<Conversation, AppError> {
        self.read(|s| s.get(id).cloned())
            .ok_or_else(|| AppError::conversation_not_found(id))
    }

    pub fn active_id(&self) -> String {
        self.read(|s| s.active_id().to_string())
    }

    pub fn search(&self, query: &str) -> Vec<Conversation> {
        self.read(|s| s.search(query).into_iter().cloned().collect())
    }

    pub fn new_chat(&self) -> Conversation {
        let conversation = self.with_store(|s| s.new_conversation().clone());
        info!("Started conversation {}", conversation.id);
        conversation
    }

    pub fn select(&self, id: &str) -> Result<(), AppError> {
        self.with_store(|s| s.select(id))
    }

    pub fn rename(&self, id: &str, title: &str) -> Result<Conversation, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
        self.with_store(|s| {
            let conversation = s.require_mut(id)?;
            conversation.title = title.to_string();
            Ok(conversation.clone())
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        self.with_store(|s| s.delete(id))?;
        info!("Deleted conversation {id}");
        Ok(())
    }

    /// Clears server-side history, then local state. A backend failure leaves
    /// local state untouched.
    pub async fn clear_all(&self) -> Result<StoreSnapshot, AppError> {
        self.backend.clear_chats().await?;
        let snapshot = self.with_store(|s| {
            s.reset();
            s.snapshot()
        });
        info!("Cleared all conversations");
        Ok(snapshot)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Messages
    // ────────────────────────────────────────────────────────────────────────

    /// Appends the user's message, then answers it according to the stage.
    /// A Fresh conversation gets the profile prompt without touching the
    /// chat backend; later stages forward the text to `/chat`.
    ///
    /// The backend round trip runs on its own task, so a caller that goes away
    /// mid-request still leaves exactly one reply and a cleared typing flag.
    pub async fn send_message(&self, id: &str, text: &str) -> Result<Conversation, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        let forward = self.with_store(|s| -> Result<bool, AppError> {
            let user_id = s.next_id();
            let prompt_id = s.next_id();
            let conversation = s.require_mut(id)?;
            conversation.push(Message::user(user_id, text));

            if conversation.stage == Stage::Fresh {
                conversation.push(Message::assistant(prompt_id, prompts::PROFILE_PROMPT));
                conversation.stage = Stage::AwaitingProfiles;
                conversation.ui.profile_prompt_open = true;
                conversation.ui.clear_suggestions();
                return Ok(false);
            }

            conversation.ui.begin_request();
            Ok(true)
        })?;

        if !forward {
            debug!("Conversation {id} asked for profiles");
            return self.conversation(id);
        }

        let this = self.clone();
        let (id, text) = (id.to_string(), text.to_string());
        joined(tokio::spawn(async move { this.answer_chat(&id, &text).await })).await
    }

    async fn answer_chat(&self, id: &str, text: &str) -> Result<Conversation, AppError> {
        let outcome = self.backend.chat(text).await;

        self.with_store(|s| {
            let message_id = s.next_id();
            let Some(conversation) = s.get_mut(id) else {
                warn!("Dropping chat reply for deleted conversation {id}");
                return Err(AppError::conversation_not_found(id));
            };
            conversation.ui.finish_request();

            match outcome {
                Ok(response) => {
                    let reply = reply::extract_reply(&response);
                    conversation.push(Message::assistant(message_id, reply));
                    if conversation.stage == Stage::OpenChat {
                        self.refresh_suggestions(conversation);
                    }
                }
                Err(e) => {
                    warn!("Chat request for {id} failed: {e}");
                    conversation.push(Message::assistant(message_id, prompts::CONNECTION_TROUBLE));
                }
            }
            Ok(conversation.clone())
        })
    }

    /// Starts a suggestion fetch for the conversation's latest reply. Only the
    /// most recent fetch for a conversation may write its result.
    fn refresh_suggestions(&self, conversation: &mut Conversation) {
        let Some(request) = suggestions::build_request(&conversation.messages) else {
            conversation.ui.clear_suggestions();
            return;
        };
        let turn = conversation.ui.start_suggestions();
        let id = conversation.id.clone();
        let this = self.clone();

        tokio::spawn(async move {
            let fetched = match this.backend.suggested_messages(&request).await {
                Ok(raw) => suggestions::normalize(raw),
                Err(e) => {
                    debug!("Suggestions unavailable for {id}: {e}");
                    Vec::new()
                }
            };
            this.with_store(|s| {
                if let Some(conversation) = s.get_mut(&id) {
                    if conversation.ui.suggestion_turn == turn {
                        conversation.ui.suggestions = fetched;
                        conversation.ui.suggestions_loading = false;
                    }
                }
            });
        });
    }

    // ────────────────────────────────────────────────────────────────────────
    // Onboarding
    // ────────────────────────────────────────────────────────────────────────

    fn require_stage(&self, id: &str, expected: Stage, action: &str) -> Result<(), AppError> {
        let stage = self
            .read(|s| s.get(id).map(|c| c.stage))
            .ok_or_else(|| AppError::conversation_not_found(id))?;
        if stage != expected {
            return Err(AppError::UnprocessableEntity(format!(
                "Cannot {action} while conversation is {}",
                stage.as_str()
            )));
        }
        Ok(())
    }

    /// Sends profile links to the extractor. Success attaches the payload
    /// verbatim and schedules the resume prompt; failure keeps the stage so
    /// the user can retry.
    pub async fn submit_profiles(
        &self,
        id: &str,
        links: ProfileLinks,
    ) -> Result<Conversation, AppError> {
        self.require_stage(id, Stage::AwaitingProfiles, "submit profiles")?;
        let links = links.validate()?;

        self.with_store(|s| s.require_mut(id).map(|c| c.ui.begin_request()))?;
        info!("Extracting profiles for conversation {id}");

        let this = self.clone();
        let id = id.to_string();
        joined(tokio::spawn(async move { this.apply_profiles(&id, links).await })).await
    }

    async fn apply_profiles(
        &self,
        id: &str,
        links: ValidatedProfileLinks,
    ) -> Result<Conversation, AppError> {
        let outcome = self.backend.extract_profiles(&links).await;

        let conversation = self.with_store(|s| {
            let message_id = s.next_id();
            let Some(conversation) = s.get_mut(id) else {
                warn!("Dropping profile result for deleted conversation {id}");
                return Err(AppError::conversation_not_found(id));
            };
            conversation.ui.finish_request();

            match outcome {
                Ok(bundle) => {
                    conversation.push(
                        Message::assistant(message_id, prompts::PROFILES_RECEIVED)
                            .with_profile(bundle),
                    );
                    if conversation.stage == Stage::AwaitingProfiles {
                        conversation.stage = Stage::AwaitingResume;
                    }
                    conversation.ui.profile_prompt_open = false;
                    conversation.ui.clear_suggestions();
                }
                Err(e) => {
                    warn!("Profile extraction for {id} failed: {e}");
                    conversation.push(Message::assistant(message_id, prompts::profile_failure(&e)));
                }
            }
            Ok(conversation.clone())
        })?;

        if conversation.stage == Stage::AwaitingResume {
            self.schedule_resume_prompt(id.to_string());
        }
        Ok(conversation)
    }

    fn schedule_resume_prompt(&self, id: String) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.resume_prompt_delay).await;
            this.with_store(|s| {
                let message_id = s.next_id();
                let Some(conversation) = s.get_mut(&id) else {
                    return;
                };
                if conversation.stage != Stage::AwaitingResume || conversation.ui.resume_prompt_open
                {
                    return;
                }
                conversation.push(Message::assistant(message_id, prompts::RESUME_PROMPT));
                conversation.ui.resume_prompt_open = true;
                conversation.ui.clear_suggestions();
            });
        });
    }

    /// Sends the resume to the parser. Success attaches the parsed fields,
    /// opens the chat and persists the resume in the background.
    pub async fn submit_resume(
        &self,
        id: &str,
        upload: ResumeUpload,
    ) -> Result<Conversation, AppError> {
        self.require_stage(id, Stage::AwaitingResume, "upload a resume")?;
        upload.validate()?;

        self.with_store(|s| s.require_mut(id).map(|c| c.ui.begin_request()))?;
        info!(
            "Parsing resume '{}' ({} bytes) for conversation {id}",
            upload.file_name,
            upload.bytes.len()
        );

        let this = self.clone();
        let id = id.to_string();
        joined(tokio::spawn(async move { this.apply_resume(&id, upload).await })).await
    }

    async fn apply_resume(&self, id: &str, upload: ResumeUpload) -> Result<Conversation, AppError> {
        let outcome = self.backend.parse_resume(&upload).await;

        self.with_store(|s| {
            let message_id = s.next_id();
            let Some(conversation) = s.get_mut(id) else {
                warn!("Dropping resume result for deleted conversation {id}");
                return Err(AppError::conversation_not_found(id));
            };
            conversation.ui.finish_request();

            match outcome {
                Ok(resume) => {
                    self.persist_resume(resume.clone());
                    conversation.push(
                        Message::assistant(message_id, prompts::RESUME_RECEIVED).with_resume(resume),
                    );
                    conversation.stage = Stage::OpenChat;
                    conversation.ui.resume_prompt_open = false;
                    conversation.ui.clear_suggestions();
                }
                Err(e) => {
                    warn!("Resume parsing for {id} failed: {e}");
                    conversation.push(Message::assistant(message_id, prompts::resume_failure(&e)));
                }
            }
            Ok(conversation.clone())
        })
    }

    fn persist_resume(&self, resume: ResumeFields) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            match backend.store_resume(&resume).await {
                Ok(()) => debug!("Resume stored on backend"),
                Err(e) => warn!("Failed to store resume on backend: {e}"),
            }
        });
    }
}

/// Awaits a request task. The task keeps running if this future is dropped.
async fn joined(
    task: JoinHandle<Result<Conversation, AppError>>,
) -> Result<Conversation, AppError> {
    task.await
        .map_err(|e| AppError::Internal(anyhow!("Request task failed: {e}")))?
}

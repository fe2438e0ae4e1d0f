use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::models::{
    Assistant, AssistantCatalog, Attachment, ChatSession, Message, MessagePart, Role,
};
use crate::providers::{GenerateRequest, GenerationProvider, InlinePayload};
use crate::services::errors::ErrorCategory;
use crate::services::kv::KvStore;
use crate::services::settings::ApiSettings;
use crate::services::store::{SessionStore, DEFAULT_TITLE};

pub const AUTO_TITLE_MAX_CHARS: usize = 30;

/// What a transcript operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The assistant's reply was appended.
    Replied,
    /// Generation failed; a categorized error message was appended in
    /// its place.
    Failed(ErrorCategory),
    /// The transcript changed without contacting the backend.
    Trimmed,
    /// Target message not found (or not applicable); nothing changed.
    Ignored,
    /// A generation call is already in flight; nothing changed.
    Busy,
}

/// Drives the four transcript actions (send, edit, regenerate, delete)
/// against the active session and owns the single outbound generation
/// call.
///
/// Two rules keep an in-flight call from corrupting history: transcript
/// operations refuse to start while one is running (`Busy`), and a
/// call's outcome is written back to the session that issued it, by id,
/// so switching or deleting sessions mid-flight cannot misapply a
/// response.
pub struct ConversationEditor {
    store: Mutex<SessionStore>,
    provider: Arc<dyn GenerationProvider>,
    catalog: AssistantCatalog,
    kv: Arc<dyn KvStore>,
    settings: Mutex<ApiSettings>,
    in_flight: AtomicBool,
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ConversationEditor {
    pub fn new(kv: Arc<dyn KvStore>, provider: Arc<dyn GenerationProvider>) -> Result<Self> {
        let catalog = AssistantCatalog::builtin();
        let store = SessionStore::load(kv.clone(), catalog.default_assistant().id.clone())?;
        let settings = ApiSettings::load(kv.as_ref());
        Ok(Self {
            store: Mutex::new(store),
            provider,
            catalog,
            kv,
            settings: Mutex::new(settings),
            in_flight: AtomicBool::new(false),
        })
    }

    // --- Session surface (store passthroughs) ---

    pub fn sessions(&self) -> Vec<ChatSession> {
        self.store.lock().unwrap().sessions().to_vec()
    }

    pub fn active_session(&self) -> ChatSession {
        self.store.lock().unwrap().active_session().clone()
    }

    pub fn active_session_id(&self) -> String {
        self.store.lock().unwrap().active_session_id().to_string()
    }

    pub fn create_session(&self) -> Result<ChatSession> {
        Ok(self.store.lock().unwrap().create_session()?.clone())
    }

    pub fn delete_session(&self, id: &str) -> Result<()> {
        self.store.lock().unwrap().delete_session(id)
    }

    pub fn rename_session(&self, id: &str, new_title: &str) -> Result<()> {
        self.store.lock().unwrap().rename_session(id, new_title)
    }

    pub fn set_active_session(&self, id: &str) -> Result<()> {
        self.store.lock().unwrap().set_active_session(id)
    }

    pub fn set_session_assistant(&self, id: &str, assistant_id: &str) -> Result<()> {
        self.store
            .lock()
            .unwrap()
            .set_session_assistant(id, assistant_id)
    }

    pub fn assistants(&self) -> &[Assistant] {
        self.catalog.all()
    }

    pub fn active_assistant(&self) -> Assistant {
        let store = self.store.lock().unwrap();
        self.catalog.get(&store.active_session().assistant_id).clone()
    }

    // --- Settings ---

    pub fn settings(&self) -> ApiSettings {
        self.settings.lock().unwrap().clone()
    }

    pub fn save_settings(&self, settings: ApiSettings) -> Result<()> {
        settings.save(self.kv.as_ref())?;
        *self.settings.lock().unwrap() = settings;
        Ok(())
    }

    // --- Transcript operations ---

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn try_begin_flight(&self) -> Option<FlightGuard<'_>> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(FlightGuard(&self.in_flight))
        }
    }

    /// Append a user turn to the active session and request the
    /// assistant's reply.
    pub async fn send(&self, text: &str, attachments: Vec<Attachment>) -> Result<TurnOutcome> {
        let Some(guard) = self.try_begin_flight() else {
            return Ok(TurnOutcome::Busy);
        };
        let (session_id, assistant, history, allow_auto_title) = {
            let store = self.store.lock().unwrap();
            let session = store.active_session();
            (
                session.id.clone(),
                self.catalog.get(&session.assistant_id).clone(),
                session.messages.clone(),
                session.title == DEFAULT_TITLE,
            )
        };
        self.run_turn(guard, session_id, assistant, text, attachments, history, allow_auto_title)
            .await
    }

    /// Replace a user turn with new text and resubmit it. The edited
    /// message and everything after it are discarded; its attachments
    /// are carried over.
    pub async fn edit_message(&self, message_id: &str, new_text: &str) -> Result<TurnOutcome> {
        let Some(guard) = self.try_begin_flight() else {
            return Ok(TurnOutcome::Busy);
        };
        let prepared = {
            let store = self.store.lock().unwrap();
            let session = store.active_session();
            session
                .messages
                .iter()
                .position(|m| m.id == message_id)
                .map(|idx| {
                    (
                        session.id.clone(),
                        self.catalog.get(&session.assistant_id).clone(),
                        session.messages[..idx].to_vec(),
                        recovered_attachments(&session.messages[idx]),
                    )
                })
        };
        let Some((session_id, assistant, history, attachments)) = prepared else {
            return Ok(TurnOutcome::Ignored);
        };
        self.run_turn(guard, session_id, assistant, new_text, attachments, history, false)
            .await
    }

    /// Reissue the prompt behind a turn. A model target resolves to the
    /// user message just before it; that message and everything after
    /// it are discarded and the prompt is sent again.
    pub async fn regenerate(&self, message_id: &str) -> Result<TurnOutcome> {
        let Some(guard) = self.try_begin_flight() else {
            return Ok(TurnOutcome::Busy);
        };
        let prepared = {
            let store = self.store.lock().unwrap();
            let session = store.active_session();
            prepare_regeneration(session, message_id).map(|(text, attachments, history)| {
                (
                    session.id.clone(),
                    self.catalog.get(&session.assistant_id).clone(),
                    text,
                    attachments,
                    history,
                )
            })
        };
        let Some((session_id, assistant, text, attachments, history)) = prepared else {
            return Ok(TurnOutcome::Ignored);
        };
        self.run_turn(guard, session_id, assistant, &text, attachments, history, false)
            .await
    }

    /// Remove a turn. A user message with its model response directly
    /// after it goes as a bonded pair; anything else goes alone. Never
    /// contacts the backend.
    pub fn delete_message(&self, message_id: &str) -> Result<TurnOutcome> {
        let Some(_guard) = self.try_begin_flight() else {
            return Ok(TurnOutcome::Busy);
        };
        let mut store = self.store.lock().unwrap();
        let (session_id, messages) = {
            let session = store.active_session();
            let Some(idx) = session.messages.iter().position(|m| m.id == message_id) else {
                return Ok(TurnOutcome::Ignored);
            };
            let bonded = session.messages[idx].role == Role::User
                && session
                    .messages
                    .get(idx + 1)
                    .is_some_and(|m| m.role == Role::Model);
            let mut messages = session.messages.clone();
            messages.drain(idx..idx + if bonded { 2 } else { 1 });
            (session.id.clone(), messages)
        };
        store.replace_messages(&session_id, messages, None)?;
        Ok(TurnOutcome::Trimmed)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_turn(
        &self,
        _guard: FlightGuard<'_>,
        session_id: String,
        assistant: Assistant,
        text: &str,
        attachments: Vec<Attachment>,
        history: Vec<Message>,
        allow_auto_title: bool,
    ) -> Result<TurnOutcome> {
        let mut parts = Vec::new();
        if !text.is_empty() {
            parts.push(MessagePart::Text(text.to_string()));
        }
        for att in &attachments {
            parts.push(MessagePart::InlineData {
                mime_type: att.mime_type.clone(),
                data: att.data.clone(),
            });
        }

        let new_title = (allow_auto_title && history.is_empty()).then(|| auto_title(text));

        let mut transcript = history;
        transcript.push(Message::new(Role::User, parts));

        // The user's turn is durable and visible before the round trip.
        self.store
            .lock()
            .unwrap()
            .replace_messages(&session_id, transcript.clone(), new_title)?;

        let request = {
            let settings = self.settings.lock().unwrap();
            GenerateRequest {
                api_key: settings.api_key.clone(),
                model: assistant.model.clone(),
                prompt: text.to_string(),
                attachments: attachments
                    .iter()
                    .map(|a| InlinePayload {
                        mime_type: a.mime_type.clone(),
                        data: a.data.clone(),
                    })
                    .collect(),
                base_url: settings.base_url_override(),
                system_instruction: assistant.system_instruction.clone(),
            }
        };

        let outcome = match self.provider.generate(request).await {
            Ok(reply_parts) => {
                transcript.push(Message::new(Role::Model, reply_parts));
                TurnOutcome::Replied
            }
            Err(err) => {
                tracing::warn!(session_id = %session_id, "Generation call failed: {err}");
                let category = ErrorCategory::from_provider_error(&err);
                transcript.push(Message::new(
                    Role::Model,
                    vec![MessagePart::Text(category.user_message(&assistant.name))],
                ));
                TurnOutcome::Failed(category)
            }
        };

        self.store
            .lock()
            .unwrap()
            .replace_messages(&session_id, transcript, None)?;
        Ok(outcome)
    }
}

/// Inline attachments of a message, ready for resubmission. The preview
/// url is not reconstructed; it is only needed in the composer.
fn recovered_attachments(message: &Message) -> Vec<Attachment> {
    message
        .parts
        .iter()
        .filter_map(|p| match p {
            MessagePart::InlineData { mime_type, data } => {
                Some(Attachment::new(mime_type.clone(), data.clone()))
            }
            MessagePart::Text(_) => None,
        })
        .collect()
}

/// Locate the user turn a regenerate targets and split out its prompt.
/// Returns the prompt text, its attachments, and the history strictly
/// before it; `None` when the target is missing or a model message has
/// no user turn before it.
fn prepare_regeneration(
    session: &ChatSession,
    message_id: &str,
) -> Option<(String, Vec<Attachment>, Vec<Message>)> {
    let mut idx = session.messages.iter().position(|m| m.id == message_id)?;
    if session.messages[idx].role == Role::Model {
        idx = idx.checked_sub(1)?;
    }
    let user_msg = &session.messages[idx];
    Some((
        user_msg.text().unwrap_or_default().to_string(),
        recovered_attachments(user_msg),
        session.messages[..idx].to_vec(),
    ))
}

/// First 30 characters of the first message, with an ellipsis when
/// truncated.
fn auto_title(text: &str) -> String {
    let mut title: String = text.chars().take(AUTO_TITLE_MAX_CHARS).collect();
    if text.chars().nth(AUTO_TITLE_MAX_CHARS).is_some() {
        title.push_str("...");
    }
    title
}

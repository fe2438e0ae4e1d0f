use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::{ChatSession, Message};
use crate::services::kv::KvStore;

pub const SESSIONS_KEY: &str = "chat_sessions";
pub const ACTIVE_SESSION_KEY: &str = "active_session_id";

/// Title given to freshly created sessions, replaced by the auto-title
/// on the first sent message.
pub const DEFAULT_TITLE: &str = "New chat";

/// Owns the session collection and the active-session pointer, writing
/// both through to the key-value store on every mutation.
///
/// Two invariants hold after every operation: the collection is never
/// empty, and the active id always names a session in the collection.
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    sessions: Vec<ChatSession>,
    active_id: String,
    default_assistant_id: String,
}

impl SessionStore {
    /// Load prior state, or start with a single default session when
    /// nothing was stored or the stored collection does not parse. Bad
    /// stored data must never prevent startup.
    pub fn load(kv: Arc<dyn KvStore>, default_assistant_id: impl Into<String>) -> Result<Self> {
        let sessions = match kv.get(SESSIONS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<ChatSession>>(&json) {
                Ok(sessions) => sessions,
                Err(e) => {
                    tracing::warn!("Discarding unreadable session state: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read session state: {e}");
                Vec::new()
            }
        };

        let mut store = Self {
            kv,
            sessions,
            active_id: String::new(),
            default_assistant_id: default_assistant_id.into(),
        };

        if store.sessions.is_empty() {
            store.create_session()?;
            return Ok(store);
        }

        store.active_id = match store.kv.get(ACTIVE_SESSION_KEY) {
            Ok(Some(id)) if store.sessions.iter().any(|s| s.id == id) => id,
            _ => store.sessions[0].id.clone(),
        };
        store.persist()?;
        Ok(store)
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn active_session_id(&self) -> &str {
        &self.active_id
    }

    pub fn active_session(&self) -> &ChatSession {
        self.sessions
            .iter()
            .find(|s| s.id == self.active_id)
            .unwrap_or(&self.sessions[0])
    }

    /// Insert a fresh session at the front of the list and make it
    /// active.
    pub fn create_session(&mut self) -> Result<&ChatSession> {
        let session = ChatSession::new(DEFAULT_TITLE, self.default_assistant_id.clone());
        tracing::debug!(session_id = %session.id, "Creating session");
        self.active_id = session.id.clone();
        self.sessions.insert(0, session);
        self.persist()?;
        Ok(&self.sessions[0])
    }

    /// Remove a session. Deleting the active session promotes the first
    /// remaining one; deleting the last session recreates a default so
    /// the collection never empties. Unknown ids are ignored.
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        let Some(idx) = self.sessions.iter().position(|s| s.id == id) else {
            return Ok(());
        };
        self.sessions.remove(idx);

        if self.sessions.is_empty() {
            self.create_session()?;
            return Ok(());
        }
        if self.active_id == id {
            self.active_id = self.sessions[0].id.clone();
        }
        self.persist()
    }

    /// Replace a session's title. Empty titles are allowed; callers that
    /// want to guard against them do so themselves.
    pub fn rename_session(&mut self, id: &str, new_title: &str) -> Result<()> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(());
        };
        session.title = new_title.to_string();
        self.persist()
    }

    pub fn set_active_session(&mut self, id: &str) -> Result<()> {
        if !self.sessions.iter().any(|s| s.id == id) {
            return Ok(());
        }
        self.active_id = id.to_string();
        self.persist()
    }

    /// Point the session at another assistant. History is untouched;
    /// only future sends use the new preset.
    pub fn set_session_assistant(&mut self, id: &str, assistant_id: &str) -> Result<()> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(());
        };
        session.assistant_id = assistant_id.to_string();
        self.persist()
    }

    /// Atomically swap a session's message sequence, optionally retitling
    /// it (auto-title on the first message). A generation result landing
    /// after its session was deleted is dropped here.
    pub fn replace_messages(
        &mut self,
        id: &str,
        messages: Vec<Message>,
        new_title: Option<String>,
    ) -> Result<()> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            tracing::warn!(session_id = id, "Dropping messages for a session that no longer exists");
            return Ok(());
        };
        session.messages = messages;
        if let Some(title) = new_title {
            session.title = title;
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let json =
            serde_json::to_string(&self.sessions).context("Failed to serialize sessions")?;
        self.kv.set(SESSIONS_KEY, &json)?;
        self.kv.set(ACTIVE_SESSION_KEY, &self.active_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, MessagePart, Role};
    use crate::services::kv::MemoryKv;

    fn fresh_store() -> (Arc<MemoryKv>, SessionStore) {
        let kv = Arc::new(MemoryKv::new());
        let store = SessionStore::load(kv.clone(), "nano-banana").unwrap();
        (kv, store)
    }

    #[test]
    fn empty_store_starts_with_one_active_session() {
        let (_, store) = fresh_store();
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.active_session_id(), store.sessions()[0].id);
        assert_eq!(store.active_session().title, DEFAULT_TITLE);
    }

    #[test]
    fn create_inserts_at_front_and_activates() {
        let (_, mut store) = fresh_store();
        let first_id = store.active_session_id().to_string();
        let new_id = store.create_session().unwrap().id.clone();

        assert_eq!(store.sessions().len(), 2);
        assert_eq!(store.sessions()[0].id, new_id);
        assert_eq!(store.sessions()[1].id, first_id);
        assert_eq!(store.active_session_id(), new_id);
    }

    #[test]
    fn deleting_last_session_recreates_a_default() {
        let (_, mut store) = fresh_store();
        let only_id = store.active_session_id().to_string();
        store.delete_session(&only_id).unwrap();

        assert_eq!(store.sessions().len(), 1);
        assert_ne!(store.sessions()[0].id, only_id);
        assert_eq!(store.active_session_id(), store.sessions()[0].id);
    }

    #[test]
    fn deleting_active_session_promotes_first_remaining() {
        let (_, mut store) = fresh_store();
        let old_id = store.active_session_id().to_string();
        let new_id = store.create_session().unwrap().id.clone();

        store.delete_session(&new_id).unwrap();
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.active_session_id(), old_id);
    }

    #[test]
    fn deleting_inactive_session_keeps_active_pointer() {
        let (_, mut store) = fresh_store();
        let old_id = store.active_session_id().to_string();
        let new_id = store.create_session().unwrap().id.clone();

        store.delete_session(&old_id).unwrap();
        assert_eq!(store.active_session_id(), new_id);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let (_, mut store) = fresh_store();
        let before = store.sessions().to_vec();

        store.delete_session("nope").unwrap();
        store.rename_session("nope", "x").unwrap();
        store.set_active_session("nope").unwrap();
        store.set_session_assistant("nope", "gemini-3-pro").unwrap();
        store
            .replace_messages("nope", vec![Message::new(Role::User, vec![])], None)
            .unwrap();

        assert_eq!(store.sessions(), &before[..]);
    }

    #[test]
    fn rename_and_assistant_updates() {
        let (_, mut store) = fresh_store();
        let id = store.active_session_id().to_string();

        store.rename_session(&id, "Bananas").unwrap();
        assert_eq!(store.active_session().title, "Bananas");

        store.rename_session(&id, "").unwrap();
        assert_eq!(store.active_session().title, "");

        store.set_session_assistant(&id, "gemini-3-pro").unwrap();
        assert_eq!(store.active_session().assistant_id, "gemini-3-pro");
        assert!(store.active_session().messages.is_empty());
    }

    #[test]
    fn replace_messages_swaps_and_retitles() {
        let (_, mut store) = fresh_store();
        let id = store.active_session_id().to_string();
        let msgs = vec![Message::new(Role::User, vec![MessagePart::Text("hi".into())])];

        store
            .replace_messages(&id, msgs.clone(), Some("hi".into()))
            .unwrap();
        assert_eq!(store.active_session().messages, msgs);
        assert_eq!(store.active_session().title, "hi");

        // No title given leaves the existing one alone.
        store.replace_messages(&id, Vec::new(), None).unwrap();
        assert_eq!(store.active_session().title, "hi");
    }

    #[test]
    fn round_trips_through_the_kv_store() {
        let (kv, mut store) = fresh_store();
        let id = store.active_session_id().to_string();
        store
            .replace_messages(
                &id,
                vec![
                    Message::new(Role::User, vec![MessagePart::Text("hello".into())]),
                    Message::new(
                        Role::Model,
                        vec![MessagePart::InlineData {
                            mime_type: "image/png".into(),
                            data: "QUJD".into(),
                        }],
                    ),
                ],
                Some("hello".into()),
            )
            .unwrap();
        store.create_session().unwrap();
        let before = store.sessions().to_vec();
        let active = store.active_session_id().to_string();

        let reloaded = SessionStore::load(kv, "nano-banana").unwrap();
        assert_eq!(reloaded.sessions(), &before[..]);
        assert_eq!(reloaded.active_session_id(), active);
    }

    #[test]
    fn corrupt_state_falls_back_to_a_default_session() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(SESSIONS_KEY, "{not json").unwrap();
        kv.set(ACTIVE_SESSION_KEY, "whatever").unwrap();

        let store = SessionStore::load(kv, "nano-banana").unwrap();
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.active_session().title, DEFAULT_TITLE);
    }

    #[test]
    fn stale_active_id_falls_back_to_first_session() {
        let (kv, store) = fresh_store();
        drop(store);
        kv.set(ACTIVE_SESSION_KEY, "gone").unwrap();

        let reloaded = SessionStore::load(kv, "nano-banana").unwrap();
        assert_eq!(reloaded.active_session_id(), reloaded.sessions()[0].id);
    }
}

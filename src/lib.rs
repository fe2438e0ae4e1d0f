//! Headless core of a Gemini chat client: session storage, transcript
//! editing (send / edit / regenerate / delete), settings, and the one
//! outbound generation call. Rendering and platform capabilities live
//! in the embedding shell.

pub mod models;
pub mod providers;
pub mod services;

pub use models::{Assistant, AssistantCatalog, Attachment, ChatSession, Message, MessagePart, Role};
pub use providers::{GeminiProvider, GenerateRequest, GenerationProvider, ProviderError};
pub use services::{
    ApiSettings, ConversationEditor, Dictation, ErrorCategory, KvStore, MemoryKv, SessionStore,
    SpeechCapture, SqliteKv, TurnOutcome,
};

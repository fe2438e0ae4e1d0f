pub mod dictation;
pub mod editor;
pub mod errors;
pub mod kv;
pub mod settings;
pub mod store;

pub use dictation::{Dictation, SpeechCapture};
pub use editor::{ConversationEditor, TurnOutcome};
pub use errors::ErrorCategory;
pub use kv::{KvStore, MemoryKv, SqliteKv};
pub use settings::ApiSettings;
pub use store::SessionStore;

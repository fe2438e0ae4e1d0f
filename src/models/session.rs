use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;

/// One independent conversation thread: its own transcript and its own
/// assistant selection. Field names stay camelCase in JSON so session
/// collections written by earlier builds load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub assistant_id: String,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(title: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            assistant_id: assistant_id.into(),
            created_at: Utc::now(),
        }
    }
}

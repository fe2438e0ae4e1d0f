use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One atomic unit of message content: a text fragment or an inline
/// base64-encoded attachment. Serializes to the same shape the Gemini
/// API uses (`{"text": ...}` / `{"inlineData": {...}}`), which is also
/// the shape previously persisted sessions carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagePart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inlineData", rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

impl MessagePart {
    pub fn text(&self) -> Option<&str> {
        match self {
            MessagePart::Text(t) => Some(t),
            MessagePart::InlineData { .. } => None,
        }
    }

    pub fn is_inline_data(&self) -> bool {
        matches!(self, MessagePart::InlineData { .. })
    }
}

/// One transcript turn. Immutable once appended: edits and deletes swap
/// the session's whole message sequence instead of mutating parts in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub parts: Vec<MessagePart>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, parts: Vec<MessagePart>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            parts,
            timestamp: Utc::now(),
        }
    }

    /// First text fragment of the message, if any.
    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| p.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
    }

    #[test]
    fn part_wire_shape() {
        let text = MessagePart::Text("hi".into());
        assert_eq!(serde_json::to_string(&text).unwrap(), r#"{"text":"hi"}"#);

        let inline = MessagePart::InlineData {
            mime_type: "image/png".into(),
            data: "QUJD".into(),
        };
        assert_eq!(
            serde_json::to_string(&inline).unwrap(),
            r#"{"inlineData":{"mimeType":"image/png","data":"QUJD"}}"#
        );

        let parsed: MessagePart =
            serde_json::from_str(r#"{"inlineData":{"mimeType":"image/png","data":"QUJD"}}"#)
                .unwrap();
        assert_eq!(parsed, inline);
    }
}

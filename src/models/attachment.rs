use base64::Engine;

/// A composer-side attachment awaiting submission. It exists only
/// between file selection and send; on send it is folded into the user
/// message's inline-data parts and the preview url is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    /// Base64-encoded payload, ready for the wire.
    pub data: String,
    /// Displayable preview. Empty when the attachment was recovered
    /// from an existing message for resubmission.
    pub preview_url: String,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            preview_url: String::new(),
        }
    }

    /// Encode raw file bytes. The preview is a data URL the UI can hand
    /// straight to an image view.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        let preview_url = format!("data:{};base64,{}", mime_type, data);
        Self {
            mime_type: mime_type.to_string(),
            data,
            preview_url,
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Permission denied: {0}")]
    AuthError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Service overloaded")]
    Overloaded,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Inline attachment payload as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePayload {
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// Everything one generation call needs. Conversation history is not
/// sent; only the latest prompt is contextualized through the system
/// instruction.
#[derive(Clone)]
pub struct GenerateRequest {
    pub api_key: String,
    pub model: String,
    /// May be empty when the turn is attachments only.
    pub prompt: String,
    pub attachments: Vec<InlinePayload>,
    /// `None` means the provider's default endpoint.
    pub base_url: Option<String>,
    pub system_instruction: Option<String>,
}

impl std::fmt::Debug for GenerateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateRequest")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("prompt", &self.prompt)
            .field("attachments", &format!("[{} attachments]", self.attachments.len()))
            .field("base_url", &self.base_url)
            .field("system_instruction", &self.system_instruction)
            .finish()
    }
}

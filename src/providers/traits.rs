use async_trait::async_trait;

use super::types::{GenerateRequest, ProviderError};
use crate::models::MessagePart;

/// The one outbound call of the application: a prompt plus attachments
/// in, one assistant turn's parts out. No retries, no cancellation; a
/// failed attempt surfaces immediately.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, request: GenerateRequest)
        -> Result<Vec<MessagePart>, ProviderError>;
}

pub mod gemini;
pub mod traits;
pub mod types;

pub use gemini::GeminiProvider;
pub use traits::GenerationProvider;
pub use types::{GenerateRequest, InlinePayload, ProviderError};

pub mod assistant;
pub mod attachment;
pub mod message;
pub mod session;

pub use assistant::{Assistant, AssistantCatalog};
pub use attachment::Attachment;
pub use message::{Message, MessagePart, Role};
pub use session::ChatSession;

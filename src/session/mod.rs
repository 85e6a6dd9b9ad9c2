pub mod manager;
pub mod store;
pub mod transcript;
pub mod types;

pub use manager::{ChatSession, ExchangeOutcome};
pub use store::ChatHistoryStore;
pub use transcript::{MemoryTranscript, Transcript, TranscriptEntry};
pub use types::{Message, Role};

use super::types::Message;
use crate::error::StorageError;
use crate::storage::LocalStorage;

pub const CHAT_HISTORY_KEY: &str = "chatHistory";

/// Ordered conversation persisted as one JSON array.
#[derive(Debug, Clone)]
pub struct ChatHistoryStore {
    storage: LocalStorage,
}

impl ChatHistoryStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Stored messages in order. Missing or undecodable history reads as empty.
    pub fn load(&self) -> Vec<Message> {
        self.storage.get_json(CHAT_HISTORY_KEY).unwrap_or_default()
    }

    pub fn save(&self, messages: &[Message]) -> Result<(), StorageError> {
        self.storage.set_json(CHAT_HISTORY_KEY, &messages)
    }

    /// Append turns and persist the full sequence in one write.
    pub fn append(&self, turns: &[Message]) -> Result<Vec<Message>, StorageError> {
        let mut messages = self.load();
        messages.extend_from_slice(turns);
        self.save(&messages)?;
        Ok(messages)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(CHAT_HISTORY_KEY)
    }
}

use super::types::UsageStats;
use crate::error::StorageError;
use crate::storage::LocalStorage;

pub const TOKEN_STATS_KEY: &str = "tokenStats";

/// Persisted cumulative token counters.
#[derive(Debug, Clone)]
pub struct UsageStore {
    storage: LocalStorage,
}

impl UsageStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Current counters; missing or undecodable state reads as zero.
    pub fn snapshot(&self) -> UsageStats {
        self.storage.get_json(TOKEN_STATS_KEY).unwrap_or_default()
    }

    pub fn accumulate(
        &self,
        prompt_tokens: Option<u64>,
        completion_tokens: Option<u64>,
        total_tokens: Option<u64>,
    ) -> Result<UsageStats, StorageError> {
        let mut stats = self.snapshot();
        stats.accumulate(prompt_tokens, completion_tokens, total_tokens);
        self.storage.set_json(TOKEN_STATS_KEY, &stats)?;
        Ok(stats)
    }

    pub fn reset(&self) -> Result<(), StorageError> {
        self.storage
            .set_json(TOKEN_STATS_KEY, &UsageStats::default())
    }
}

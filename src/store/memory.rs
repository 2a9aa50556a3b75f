//! In-memory flag store for tests and ephemeral runs.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::traits::FlagStore;

#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: RwLock<HashSet<String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given keys already set.
    pub fn with_flags<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: RwLock::new(keys.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get_flag(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.flags.read().await.contains(key))
    }

    async fn set_flag(&self, key: &str) -> Result<(), StoreError> {
        self.flags.write().await.insert(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_until_set() {
        let store = MemoryFlagStore::new();
        assert!(!store.get_flag("tour_completed").await.unwrap());
        store.set_flag("tour_completed").await.unwrap();
        assert!(store.get_flag("tour_completed").await.unwrap());
        assert!(!store.get_flag("other").await.unwrap());
    }

    #[tokio::test]
    async fn preset_flags() {
        let store = MemoryFlagStore::with_flags(["tour_completed"]);
        assert!(store.get_flag("tour_completed").await.unwrap());
    }
}

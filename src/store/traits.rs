//! `FlagStore` trait: boolean key-value persistence.

use async_trait::async_trait;

use crate::error::StoreError;

/// Backend-agnostic boolean flag store.
///
/// Flags only ever move from unset to set; there is no clear operation.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Whether `key` has been set. Unknown keys read as `false`.
    async fn get_flag(&self, key: &str) -> Result<bool, StoreError>;

    /// Set `key` to true. Idempotent.
    async fn set_flag(&self, key: &str) -> Result<(), StoreError>;
}

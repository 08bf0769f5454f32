//! `KeyValueStore` trait — the client-side string store the session lives in.

use async_trait::async_trait;

use crate::error::StoreError;

/// Backend-agnostic key-value store with last-writer-wins semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether an entry existed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

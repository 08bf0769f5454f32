//! SessionManager — single owner of the session lifecycle.
//!
//! Storage and parse failures never surface: a session that cannot be read
//! is treated as absent and the application continues anonymously.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::model::Session;
use crate::store::KeyValueStore;

/// Store key holding the serialized session.
pub const SESSION_KEY: &str = "pawprint.session";

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    current: Option<Session>,
}

impl SessionManager {
    /// Create a manager and load whatever session the store holds.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let current = read_session(store.as_ref()).await;
        if let Some(ref session) = current {
            info!(user_id = %session.user_id, role = %session.role, "Restored session");
        }
        Self { store, current }
    }

    /// The cached session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Re-read the session from the store.
    ///
    /// Picks up external writes and removals (including corruption).
    pub async fn refresh(&mut self) -> Option<&Session> {
        self.current = read_session(self.store.as_ref()).await;
        self.current.as_ref()
    }

    /// Make `session` current and persist it.
    ///
    /// A persistence failure is logged; the session stays active for this run.
    pub async fn login(&mut self, session: Session) {
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(e) = self.store.set(SESSION_KEY, &raw).await {
                    warn!(error = %e, "Failed to persist session");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize session"),
        }
        info!(user_id = %session.user_id, role = %session.role, "Logged in");
        self.current = Some(session);
    }

    /// Drop the current session and remove it from the store.
    pub async fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            info!(user_id = %session.user_id, "Logged out");
        }
        if let Err(e) = self.store.remove(SESSION_KEY).await {
            warn!(error = %e, "Failed to remove persisted session");
        }
    }
}

/// Read and parse the stored session. Malformed entries are discarded.
async fn read_session(store: &dyn KeyValueStore) -> Option<Session> {
    let raw = match store.get(SESSION_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Could not read stored session, continuing anonymously");
            return None;
        }
    };

    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(error = %e, "Discarding malformed stored session");
            if let Err(e) = store.remove(SESSION_KEY).await {
                debug!(error = %e, "Failed to remove malformed session");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::StoreError;
    use crate::session::Role;
    use crate::store::MemoryStore;

    /// Store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Connection("disk gone".into()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Connection("disk gone".into()))
        }
        async fn remove(&self, _key: &str) -> Result<bool, StoreError> {
            Err(StoreError::Connection("disk gone".into()))
        }
    }

    fn alice() -> Session {
        Session::new("u-alice", Role::Regular, "Alice")
    }

    #[tokio::test]
    async fn empty_store_is_anonymous() {
        let manager = SessionManager::load(Arc::new(MemoryStore::new())).await;
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn login_persists_and_reload_restores() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut manager = SessionManager::load(Arc::clone(&store)).await;
        manager.login(alice()).await;
        assert_eq!(manager.current(), Some(&alice()));

        let reloaded = SessionManager::load(store).await;
        assert_eq!(reloaded.current(), Some(&alice()));
    }

    #[tokio::test]
    async fn logout_removes_entry() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut manager = SessionManager::load(Arc::clone(&store)).await;
        manager.login(alice()).await;
        manager.logout().await;

        assert!(manager.current().is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_entry_is_discarded() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(SESSION_KEY, "{not json").await.unwrap();

        let manager = SessionManager::load(Arc::clone(&store)).await;
        assert!(manager.current().is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_sees_corruption() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut manager = SessionManager::load(Arc::clone(&store)).await;
        manager.login(alice()).await;

        store.set(SESSION_KEY, "\"just a string\"").await.unwrap();
        assert!(manager.refresh().await.is_none());
    }

    #[tokio::test]
    async fn broken_store_fails_open() {
        let mut manager = SessionManager::load(Arc::new(BrokenStore)).await;
        assert!(manager.current().is_none());

        manager.login(alice()).await;
        assert_eq!(manager.current(), Some(&alice()));

        manager.logout().await;
        assert!(manager.current().is_none());
    }
}

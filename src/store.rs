use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::ConnectError;

/// How long pending authorization state and handed-off credentials live.
pub const TRANSIENT_TTL: Duration = Duration::from_secs(600);

/// Contract for the transient key-value store backing state and credential
/// handoff. Hosts typically implement this over Redis or a similar cache;
/// [`MemoryStore`] is provided for single-process hosts and tests.
#[async_trait]
pub trait TransientStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, expire: Duration) -> Result<(), ConnectError>;
    async fn get(&self, key: &str) -> Result<Option<String>, ConnectError>;
    async fn delete(&self, key: &str) -> Result<(), ConnectError>;
}

pub(crate) fn state_key(provider: &str, org_id: &str, user_id: &str) -> String {
    format!("{provider}_state:{org_id}:{user_id}")
}

pub(crate) fn credentials_key(provider: &str, org_id: &str, user_id: &str) -> String {
    format!("{provider}_credentials:{org_id}:{user_id}")
}

/// In-memory [`TransientStore`] with per-key expiry. Expired entries are
/// dropped lazily on access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>>, ConnectError> {
        self.entries.lock().map_err(|_| ConnectError::Store {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl TransientStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, expire: Duration) -> Result<(), ConnectError> {
        let deadline = Instant::now() + expire;
        self.lock()?
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ConnectError> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), ConnectError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{MemoryStore, TransientStore, credentials_key, state_key};

    #[test]
    fn composite_keys_scope_by_provider_org_and_user() {
        assert_eq!(state_key("hubspot", "org-1", "user-2"), "hubspot_state:org-1:user-2");
        assert_eq!(
            credentials_key("slack", "org-1", "user-2"),
            "slack_credentials:org-1:user-2"
        );
    }

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwrites_value_under_same_key() {
        let store = MemoryStore::new();
        store.set("k", "old", Duration::from_secs(60)).await.unwrap();
        store.set("k", "new", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn expired_entries_are_absent() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use sitegate_auth::{ProviderError, SessionClaims, SessionResolver};

/// In-memory token → session map for tests/dev.
///
/// Stores claims as issued; expiry is enforced by the guard, not here.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<String, SessionClaims>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, claims: SessionClaims) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(token.into(), claims);
        }
    }

    pub fn revoke(&self, token: &str) -> Option<SessionClaims> {
        self.inner.write().ok()?.remove(token)
    }
}

#[async_trait]
impl SessionResolver for InMemorySessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<SessionClaims>, ProviderError> {
        let map = self
            .inner
            .read()
            .map_err(|_| ProviderError::unavailable("session store lock poisoned"))?;
        Ok(map.get(token).cloned())
    }
}

//! Remote document store collaborator.
//!
//! Everything here is best-effort from the caller's point of view: the
//! lifecycle layer mirrors writes into this store and swallows any error it
//! returns. Documents share the quote's id as their key, so local and remote
//! describe the same logical record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::auth::UserId;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote request failed: {0}")]
    Transport(String),
    #[error("remote returned status {status}")]
    Status { status: u16 },
    #[error("remote returned an undecodable body: {0}")]
    Decode(String),
    #[error("remote store is unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RemoteDocumentStore: Send + Sync {
    /// Upsert a document at a known key.
    async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<(), RemoteError>;

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, RemoteError>;

    /// Merge-style update of top-level fields.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), RemoteError>;

    async fn add_to_user_collection(
        &self,
        name: &str,
        owner: &UserId,
        id: &str,
    ) -> Result<(), RemoteError>;

    async fn remove_from_user_collection(
        &self,
        name: &str,
        owner: &UserId,
        id: &str,
    ) -> Result<(), RemoteError>;

    async fn get_user_collection(
        &self,
        name: &str,
        owner: &UserId,
    ) -> Result<Vec<String>, RemoteError>;
}

/// Stand-in used when remote mirroring is turned off in configuration.
/// Every call errors; callers that consult the auth session first will
/// normally never reach it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledRemoteStore;

impl DisabledRemoteStore {
    fn unavailable<T>() -> Result<T, RemoteError> {
        Err(RemoteError::Unavailable("remote mirroring is disabled".to_string()))
    }
}

#[async_trait]
impl RemoteDocumentStore for DisabledRemoteStore {
    async fn create_with_id(&self, _: &str, _: &str, _: Value) -> Result<(), RemoteError> {
        Self::unavailable()
    }

    async fn get_by_id(&self, _: &str, _: &str) -> Result<Option<Value>, RemoteError> {
        Self::unavailable()
    }

    async fn update(&self, _: &str, _: &str, _: Map<String, Value>) -> Result<(), RemoteError> {
        Self::unavailable()
    }

    async fn add_to_user_collection(
        &self,
        _: &str,
        _: &UserId,
        _: &str,
    ) -> Result<(), RemoteError> {
        Self::unavailable()
    }

    async fn remove_from_user_collection(
        &self,
        _: &str,
        _: &UserId,
        _: &str,
    ) -> Result<(), RemoteError> {
        Self::unavailable()
    }

    async fn get_user_collection(&self, _: &str, _: &UserId) -> Result<Vec<String>, RemoteError> {
        Self::unavailable()
    }
}

/// Test double with a failure switch and a write counter, so tests can
/// assert both that mirroring happened and that its failure is harmless.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    documents: RwLock<HashMap<String, HashMap<String, Value>>>,
    memberships: RwLock<HashMap<String, Vec<String>>>,
    fail_requests: AtomicBool,
    write_count: AtomicUsize,
}

impl InMemoryRemoteStore {
    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }

    fn membership_key(name: &str, owner: &UserId) -> String {
        format!("{}/{}", owner.0, name)
    }
}

#[async_trait]
impl RemoteDocumentStore for InMemoryRemoteStore {
    async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<(), RemoteError> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        documents.entry(collection.to_string()).or_default().insert(id.to_string(), document);
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, RemoteError> {
        self.check_available()?;
        let documents = self.documents.read().await;
        Ok(documents.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), RemoteError> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        let doc = documents
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if let Value::Object(existing) = doc {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn add_to_user_collection(
        &self,
        name: &str,
        owner: &UserId,
        id: &str,
    ) -> Result<(), RemoteError> {
        self.check_available()?;
        let mut memberships = self.memberships.write().await;
        let ids = memberships.entry(Self::membership_key(name, owner)).or_default();
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_from_user_collection(
        &self,
        name: &str,
        owner: &UserId,
        id: &str,
    ) -> Result<(), RemoteError> {
        self.check_available()?;
        let mut memberships = self.memberships.write().await;
        if let Some(ids) = memberships.get_mut(&Self::membership_key(name, owner)) {
            ids.retain(|existing| existing != id);
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_user_collection(
        &self,
        name: &str,
        owner: &UserId,
    ) -> Result<Vec<String>, RemoteError> {
        self.check_available()?;
        let memberships = self.memberships.read().await;
        Ok(memberships.get(&Self::membership_key(name, owner)).cloned().unwrap_or_default())
    }
}

use crate::models::{DocumentInfo, DocumentType, Infraction, User};
use moka::future::Cache;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const DOCUMENT_TYPES_KEY: &str = "document_types";

/// In-memory holders for the current session.
///
/// One slot each for the document-type list, the current user, the queried
/// document and the last infraction list. `set_*` overwrites, `*()` getters
/// return `None` until set. Nothing expires and nothing is persisted; only the
/// document-type slot can be cleared explicitly.
pub struct SessionCache {
    document_types: Cache<&'static str, Arc<Vec<DocumentType>>>,
    user: RwLock<Option<User>>,
    document_info: RwLock<Option<DocumentInfo>>,
    infractions: RwLock<Option<Vec<Infraction>>>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            document_types: Cache::builder().max_capacity(1).build(),
            user: RwLock::new(None),
            document_info: RwLock::new(None),
            infractions: RwLock::new(None),
        }
    }

    // Slots hold plain data, so a poisoned lock still has a usable value.
    fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
        lock.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
        lock.write().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn document_types(&self) -> Option<Arc<Vec<DocumentType>>> {
        self.document_types.get(&DOCUMENT_TYPES_KEY).await
    }

    pub async fn set_document_types(&self, types: Arc<Vec<DocumentType>>) {
        self.document_types.insert(DOCUMENT_TYPES_KEY, types).await;
    }

    /// Returns the cached list, running `fetch` once when the slot is empty.
    ///
    /// Concurrent callers wait on the same fetch instead of issuing their own.
    pub async fn document_types_or_fetch<F, E>(&self, fetch: F) -> Result<Arc<Vec<DocumentType>>, E>
    where
        F: std::future::Future<Output = Result<Arc<Vec<DocumentType>>, E>>,
        E: Clone + Send + Sync + 'static,
    {
        self.document_types
            .try_get_with(DOCUMENT_TYPES_KEY, fetch)
            .await
            .map_err(|e| (*e).clone())
    }

    pub fn clear_document_types(&self) {
        self.document_types.invalidate_all();
        tracing::debug!(component = "session", "Document type cache cleared");
    }

    pub fn user(&self) -> Option<User> {
        Self::read(&self.user).clone()
    }

    pub fn set_user(&self, user: User) {
        *Self::write(&self.user) = Some(user);
    }

    pub fn document_info(&self) -> Option<DocumentInfo> {
        Self::read(&self.document_info).clone()
    }

    pub fn set_document_info(&self, info: DocumentInfo) {
        *Self::write(&self.document_info) = Some(info);
    }

    pub fn infractions(&self) -> Option<Vec<Infraction>> {
        Self::read(&self.infractions).clone()
    }

    pub fn set_infractions(&self, infractions: Vec<Infraction>) {
        *Self::write(&self.infractions) = Some(infractions);
    }

    /// Name shown on the results screen, empty when no user is cached.
    pub fn display_name(&self) -> String {
        Self::read(&self.user)
            .as_ref()
            .map(User::display_name)
            .unwrap_or_default()
    }

    /// Document number of the current session.
    ///
    /// Falls back to the cached user's own document number.
    pub fn document_number(&self) -> Option<String> {
        if let Some(info) = Self::read(&self.document_info).as_ref() {
            return Some(info.document_number.clone());
        }
        Self::read(&self.user)
            .as_ref()
            .and_then(|u| u.document_number.as_ref())
            .map(|n| n.as_text())
    }
}

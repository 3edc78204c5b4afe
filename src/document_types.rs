//! Document type reference data (`/api/documentType`).
//!
//! The list is fetched once and kept in the session cache for the lifetime of
//! the process; lookups between abbreviation and id go through that cache.

use crate::api_client::{list_payload, ApiClient};
use crate::errors::AppError;
use crate::models::DocumentType;
use crate::session::SessionCache;
use crate::validation::validate_list;
use std::collections::HashMap;
use std::sync::Arc;

const API_PATH: &str = "/api/documentType";
const COMPONENT: &str = "document_types";

/// Builds an abbreviation -> id map, e.g. `{CC: 1, CE: 2, TI: 3, PAS: 4}`.
pub fn build_document_type_map(types: &[DocumentType]) -> HashMap<String, i64> {
    types
        .iter()
        .map(|dt| (dt.abbreviation.clone(), dt.id))
        .collect()
}

#[derive(Clone)]
pub struct DocumentTypeService {
    client: ApiClient,
    session: Arc<SessionCache>,
}

impl DocumentTypeService {
    pub fn new(client: ApiClient, session: Arc<SessionCache>) -> Self {
        Self { client, session }
    }

    /// Returns the document types, from cache unless `force_refresh` is set.
    ///
    /// # Errors
    ///
    /// * `AppError::Network` when the backend cannot be reached.
    /// * `AppError::Validation` when any record does not match the schema.
    pub async fn list(&self, force_refresh: bool) -> Result<Arc<Vec<DocumentType>>, AppError> {
        const FUNCTION: &str = "list";

        if force_refresh {
            self.session.clear_document_types();
        } else if let Some(cached) = self.session.document_types().await {
            tracing::debug!(
                component = COMPONENT,
                function = FUNCTION,
                "Returning {} document types from cache",
                cached.len()
            );
            return Ok(cached);
        }

        self.session
            .document_types_or_fetch(self.fetch())
            .await
            .map_err(|e| {
                tracing::error!(
                    component = COMPONENT,
                    function = FUNCTION,
                    error = %e,
                    "Failed to fetch document types"
                );
                e
            })
    }

    async fn fetch(&self) -> Result<Arc<Vec<DocumentType>>, AppError> {
        tracing::debug!(
            component = COMPONENT,
            function = "fetch",
            "Fetching document types from backend"
        );

        let raw = self
            .client
            .get(API_PATH)
            .await
            .map_err(|e| e.on_unreachable("Could not connect to the document type server"))?;

        let types = validate_list::<DocumentType>(&list_payload(raw)).map_err(|e| {
            tracing::warn!(
                component = COMPONENT,
                function = "fetch",
                error = %e,
                "Some document types do not match the schema"
            );
            AppError::Validation("Invalid document type data".to_string())
        })?;

        tracing::debug!(
            component = COMPONENT,
            function = "fetch",
            "{} document types fetched and cached",
            types.len()
        );
        Ok(Arc::new(types))
    }

    /// Id for an abbreviation, matched case-insensitively.
    ///
    /// Returns `None` (never an error) when the abbreviation is unknown or the
    /// list could not be loaded.
    pub async fn id_for(&self, abbreviation: &str) -> Option<i64> {
        const FUNCTION: &str = "id_for";

        let types = match self.list(false).await {
            Ok(types) => types,
            Err(e) => {
                tracing::error!(
                    component = COMPONENT,
                    function = FUNCTION,
                    error = %e,
                    "Could not resolve id for '{}'",
                    abbreviation
                );
                return None;
            }
        };

        let wanted = abbreviation.trim().to_uppercase();
        let found = types
            .iter()
            .find(|dt| dt.abbreviation.to_uppercase() == wanted)
            .map(|dt| dt.id);

        if found.is_none() {
            tracing::warn!(
                component = COMPONENT,
                function = FUNCTION,
                "Document type with abbreviation '{}' not found",
                abbreviation
            );
        }
        found
    }

    /// Abbreviation for an id, or `None` when unknown.
    pub async fn abbreviation_for(&self, id: i64) -> Option<String> {
        const FUNCTION: &str = "abbreviation_for";

        let types = match self.list(false).await {
            Ok(types) => types,
            Err(e) => {
                tracing::error!(
                    component = COMPONENT,
                    function = FUNCTION,
                    error = %e,
                    "Could not resolve abbreviation for id {}",
                    id
                );
                return None;
            }
        };

        let found = types
            .iter()
            .find(|dt| dt.id == id)
            .map(|dt| dt.abbreviation.clone());

        if found.is_none() {
            tracing::warn!(
                component = COMPONENT,
                function = FUNCTION,
                "Document type with id {} not found",
                id
            );
        }
        found
    }

    /// Drops the cached list so the next call refetches it.
    pub fn clear_cache(&self) {
        self.session.clear_document_types();
    }
}

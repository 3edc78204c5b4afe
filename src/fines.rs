//! Fines consultation workflow.
//!
//! Resolves the document type, finds the user, queries the infractions for the
//! same document and keeps only those that belong to that user. On success the
//! user (with its name completed from the infraction) and the infraction list
//! are stored in the session cache for the result views.

use crate::document_types::DocumentTypeService;
use crate::errors::AppError;
use crate::infractions::InfractionService;
use crate::models::{DocumentInfo, Infraction, InfractionFilter, User};
use crate::session::SessionCache;
use crate::users::UserService;
use std::sync::Arc;

const COMPONENT: &str = "fines";

pub const MISSING_DOCUMENT_MESSAGE: &str = "Select a document type and number.";
pub const NO_USER_MESSAGE: &str = "No user exists with that document.";
pub const NO_FINES_MESSAGE: &str = "No fines were found for this document.";

/// Outcome of a successful consultation.
#[derive(Debug, Clone, PartialEq)]
pub struct FinesResult {
    pub user: User,
    pub infractions: Vec<Infraction>,
}

/// True when `infraction` was issued to `user`.
///
/// Ids are compared as text when both sides carry one. Without an infraction
/// `userId`, the user names are compared trimmed and case-insensitively.
pub fn belongs_to(user: &User, infraction: &Infraction) -> bool {
    if let Some(user_id) = &infraction.user_id {
        return user_id.as_text() == user.id.as_text();
    }
    match (user.user_name.as_deref(), infraction.user_name.as_deref()) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
            a.trim().to_lowercase() == b.trim().to_lowercase()
        }
        _ => false,
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}

/// Completes the user's names from the first matching infraction.
///
/// `userName` comes from the infraction, falling back to the user's own. Each
/// of first and last name is taken from the infraction, then from the user,
/// then from splitting the infraction `userName` on whitespace.
pub fn enrich_user(user: &User, infraction: &Infraction) -> User {
    let parts: Vec<&str> = infraction
        .user_name
        .as_deref()
        .map(|n| n.split_whitespace().collect())
        .unwrap_or_default();

    let split_first = parts.first().map(|s| s.to_string());
    let split_last = (parts.len() > 1).then(|| parts[1..].join(" "));

    let first_name = non_empty(infraction.first_name.as_ref())
        .or_else(|| non_empty(user.first_name.as_ref()))
        .or(split_first)
        .unwrap_or_default();
    let last_name = non_empty(infraction.last_name.as_ref())
        .or_else(|| non_empty(user.last_name.as_ref()))
        .or(split_last)
        .unwrap_or_default();

    User {
        user_name: non_empty(infraction.user_name.as_ref()).or_else(|| user.user_name.clone()),
        first_name: Some(first_name),
        last_name: Some(last_name),
        ..user.clone()
    }
}

/// Runs the consultation across the document type, user and infraction services.
#[derive(Clone)]
pub struct FinesService {
    document_types: DocumentTypeService,
    users: UserService,
    infractions: InfractionService,
    session: Arc<SessionCache>,
}

impl FinesService {
    pub fn new(
        document_types: DocumentTypeService,
        users: UserService,
        infractions: InfractionService,
        session: Arc<SessionCache>,
    ) -> Self {
        Self {
            document_types,
            users,
            infractions,
            session,
        }
    }

    /// Consults the fines registered under a document.
    ///
    /// # Errors
    ///
    /// * `AppError::BadRequest` - unknown document type or empty number.
    /// * `AppError::NotFound` - no user for the document, or no fines for it.
    /// * Any error from the underlying services, unchanged.
    pub async fn consult(
        &self,
        document_abbreviation: &str,
        document_number: &str,
    ) -> Result<FinesResult, AppError> {
        const FUNCTION: &str = "consult";
        let document_number = document_number.trim();

        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            document_type = document_abbreviation,
            "Consulting fines"
        );

        let document_type_id = match self.document_types.id_for(document_abbreviation).await {
            Some(id) if !document_number.is_empty() => id,
            _ => return Err(AppError::BadRequest(MISSING_DOCUMENT_MESSAGE.to_string())),
        };

        self.session.set_document_info(DocumentInfo {
            document_type_id,
            document_number: document_number.to_string(),
        });

        let user = self
            .users
            .find_by_document(document_type_id, document_number)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_USER_MESSAGE.to_string()))?;

        let filter = InfractionFilter {
            document_type_id: Some(document_type_id),
            document_number: Some(document_number.to_string()),
        };
        let fetched = self.infractions.query(&filter).await?;
        let fetched_count = fetched.len();

        let infractions: Vec<Infraction> = fetched
            .into_iter()
            .filter(|infraction| belongs_to(&user, infraction))
            .collect();

        if infractions.len() < fetched_count {
            tracing::debug!(
                component = COMPONENT,
                function = FUNCTION,
                "Dropped {} infractions that belong to another user",
                fetched_count - infractions.len()
            );
        }

        let Some(first) = infractions.first() else {
            self.session.set_user(user);
            return Err(AppError::NotFound(NO_FINES_MESSAGE.to_string()));
        };

        let user = enrich_user(&user, first);
        self.session.set_user(user.clone());
        self.session.set_infractions(infractions.clone());

        tracing::info!(
            component = COMPONENT,
            function = FUNCTION,
            user_id = %user.id,
            "{} fines found",
            infractions.len()
        );

        Ok(FinesResult { user, infractions })
    }
}

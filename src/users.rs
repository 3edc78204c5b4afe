use crate::api_client::{list_payload, ApiClient, RequestOptions};
use crate::errors::AppError;
use crate::models::User;
use serde_json::Value;

const API_PATH: &str = "/api/Users";
const COMPONENT: &str = "users";

/// Client for `/api/Users`.
#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Finds the user registered under a document.
    ///
    /// Both values are sent as query parameters, but the backend does not
    /// reliably filter on them, so the result is filtered again here. A record
    /// matches when its `documentTypeId` and `documentNumber` equal the inputs
    /// as text, so `123` and `"123"` are the same number.
    ///
    /// Matching runs on the raw records and only the match is deserialized.
    /// No value checks apply here, so a blank or malformed `email` does not
    /// hide the user. A matching record that does not deserialize is skipped
    /// with a warning.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - when either input is empty or no user matches.
    pub async fn find_by_document(
        &self,
        document_type_id: i64,
        document_number: &str,
    ) -> Result<Option<User>, AppError> {
        const FUNCTION: &str = "find_by_document";

        if document_type_id == 0 || document_number.is_empty() {
            tracing::warn!(
                component = COMPONENT,
                function = FUNCTION,
                "Document type and number are required"
            );
            return Ok(None);
        }

        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            document_type_id,
            "Looking up user by document"
        );

        let options = RequestOptions::get()
            .param("documentTypeId", Some(document_type_id))
            .param("documentNumber", Some(document_number));

        let raw = self
            .client
            .request(API_PATH, options)
            .await
            .map_err(|e| {
                let e = e.on_unreachable("Could not connect to the users server");
                tracing::error!(
                    component = COMPONENT,
                    function = FUNCTION,
                    error = %e,
                    "User lookup failed"
                );
                e
            })?;

        let wanted_type = document_type_id.to_string();
        let found = list_payload(raw)
            .into_iter()
            .filter(|record| {
                field_text(record, "documentTypeId").as_deref() == Some(wanted_type.as_str())
                    && field_text(record, "documentNumber").as_deref() == Some(document_number)
            })
            .find_map(|record| match serde_json::from_value::<User>(record) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(
                        component = COMPONENT,
                        function = FUNCTION,
                        error = %e,
                        "Skipping matching user record with an unexpected shape"
                    );
                    None
                }
            });

        match &found {
            Some(user) => tracing::debug!(
                component = COMPONENT,
                function = FUNCTION,
                user_id = %user.id,
                "User found"
            ),
            None => tracing::debug!(
                component = COMPONENT,
                function = FUNCTION,
                "No user matches the document"
            ),
        }

        Ok(found)
    }
}

/// Text form of a string or numeric field.
fn field_text(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

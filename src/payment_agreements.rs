use crate::api_client::{list_payload, ApiClient};
use crate::errors::AppError;
use crate::models::PaymentAgreement;
use crate::validation::validate_list_lenient;
use serde_json::Value;

const API_PATH: &str = "/api/PaymentAgreement";
const COMPONENT: &str = "payment_agreements";

/// Unwraps the agreement payload.
///
/// A bare array and `{data: [...]}` are lists; any other object is a single
/// agreement.
fn agreement_payload(value: Value) -> Vec<Value> {
    match value {
        Value::Object(map) if !matches!(map.get("data"), Some(Value::Array(_))) => {
            vec![Value::Object(map)]
        }
        other => list_payload(other),
    }
}

/// Client for `/api/PaymentAgreement`. The endpoint has no filters.
#[derive(Clone)]
pub struct PaymentAgreementService {
    client: ApiClient,
}

impl PaymentAgreementService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Every agreement the backend knows about.
    pub async fn list_all(&self) -> Result<Vec<PaymentAgreement>, AppError> {
        const FUNCTION: &str = "list_all";
        tracing::debug!(component = COMPONENT, function = FUNCTION, "Fetching payment agreements");

        let raw = self.client.get(API_PATH).await.map_err(|e| {
            let e = e.on_unreachable("Could not connect to the payment agreements server");
            tracing::error!(
                component = COMPONENT,
                function = FUNCTION,
                error = %e,
                "Payment agreement listing failed"
            );
            e
        })?;

        let agreements: Vec<PaymentAgreement> =
            validate_list_lenient(&agreement_payload(raw), COMPONENT);
        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            "{} payment agreements fetched",
            agreements.len()
        );
        Ok(agreements)
    }

    /// Agreements whose `documentNumber` (or `document`) equals
    /// `document_number` after trimming both sides.
    ///
    /// Returns an empty list without calling the backend when no document is
    /// given.
    pub async fn list_by_document(
        &self,
        document_number: Option<&str>,
    ) -> Result<Vec<PaymentAgreement>, AppError> {
        const FUNCTION: &str = "list_by_document";

        let wanted = match document_number.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                tracing::debug!(
                    component = COMPONENT,
                    function = FUNCTION,
                    "No document number given"
                );
                return Ok(Vec::new());
            }
        };

        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            document_number = %wanted,
            "Fetching payment agreements for document"
        );

        let found: Vec<PaymentAgreement> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|a| a.document_text() == wanted)
            .collect();
        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            "{} payment agreements match the document",
            found.len()
        );
        Ok(found)
    }
}

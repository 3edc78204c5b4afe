use crate::api_client::{list_payload, ApiClient, RequestOptions};
use crate::errors::AppError;
use crate::formatters::{format_currency, format_date};
use crate::models::{Infraction, InfractionFilter};
use crate::validation::validate_list_lenient;
use serde::Serialize;

const API_PATH: &str = "/api/UserInfraction";
const COMPONENT: &str = "infractions";

/// Client for `/api/UserInfraction`.
#[derive(Clone)]
pub struct InfractionService {
    client: ApiClient,
}

impl InfractionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Queries infractions, optionally filtered by document.
    ///
    /// With no filter set the backend is asked for the full listing
    /// (`getAllType=GetAll`). Records that fail validation are dropped and the
    /// rest are returned.
    pub async fn query(&self, filter: &InfractionFilter) -> Result<Vec<Infraction>, AppError> {
        const FUNCTION: &str = "query";

        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            ?filter,
            "Querying infractions"
        );

        let document_type_id = filter.document_type_id.filter(|id| *id != 0);
        let document_number = filter
            .document_number
            .as_deref()
            .filter(|n| !n.is_empty());

        let mut options = RequestOptions::get()
            .param("documentTypeId", document_type_id)
            .param("documentNumber", document_number);
        if document_type_id.is_none() && document_number.is_none() {
            options = options.param("getAllType", Some("GetAll"));
        }

        let raw = self
            .client
            .request(API_PATH, options)
            .await
            .map_err(|e| {
                let e = e.on_unreachable("Could not connect to the infractions server");
                tracing::error!(
                    component = COMPONENT,
                    function = FUNCTION,
                    error = %e,
                    "Infraction query failed"
                );
                e
            })?;

        let infractions: Vec<Infraction> = validate_list_lenient(&list_payload(raw), COMPONENT);
        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            "{} infractions fetched",
            infractions.len()
        );
        Ok(infractions)
    }
}

/// Display-ready view of a single infraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfractionDetail {
    pub type_label: String,
    pub description: String,
    pub amount: String,
    pub date: String,
    pub due_date: String,
    pub reference_number: String,
}

impl From<&Infraction> for InfractionDetail {
    fn from(infraction: &Infraction) -> Self {
        Self {
            type_label: infraction
                .type_label()
                .unwrap_or("Not specified")
                .to_string(),
            description: infraction.description_text().unwrap_or_default().to_string(),
            amount: format_currency(infraction.amount_due()),
            date: format_date(infraction.infraction_date()),
            due_date: format_date(infraction.due_date_text()),
            reference_number: infraction
                .reference_number()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

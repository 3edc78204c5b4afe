//! Payment endpoints under `/api/payment`.
//!
//! Preference and status responses are required to match their schema
//! exactly; a malformed preference cannot be used for checkout, so there is no
//! fallback. The payment history is validated item by item and the health
//! check hands back the raw document when it does not validate.

use crate::api_client::{list_payload, ApiClient, RequestOptions};
use crate::errors::AppError;
use crate::models::{HealthReport, PaymentHealth, PaymentPreference, PaymentStatus, UserPayment};
use crate::validation::{validate, validate_list_lenient};

const BASE_PATH: &str = "/api/payment";
const COMPONENT: &str = "payments";
const UNREACHABLE: &str = "Could not connect to the payments server";

#[derive(Clone)]
pub struct PaymentService {
    client: ApiClient,
}

impl PaymentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn require_positive(id: i64, message: &str, function: &'static str) -> Result<(), AppError> {
        if id > 0 {
            return Ok(());
        }
        let err = AppError::Validation(message.to_string());
        tracing::error!(component = COMPONENT, function, id, error = %err, "Rejected before request");
        Err(err)
    }

    fn log_failure(e: AppError, function: &'static str, what: &str) -> AppError {
        let e = e.on_unreachable(UNREACHABLE);
        tracing::error!(component = COMPONENT, function, error = %e, "{} failed", what);
        e
    }

    /// Creates a checkout preference for one user infraction.
    ///
    /// # Errors
    ///
    /// * `AppError::Validation` - when `user_infraction_id <= 0` (no request is
    ///   made) or the response does not match the preference schema.
    pub async fn create_preference(
        &self,
        user_infraction_id: i64,
    ) -> Result<PaymentPreference, AppError> {
        const FUNCTION: &str = "create_preference";
        Self::require_positive(user_infraction_id, "Invalid infraction id", FUNCTION)?;

        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            user_infraction_id,
            "Creating payment preference"
        );

        let options = RequestOptions::post()
            .header("Content-Type", "application/json")
            .header("accept", "application/json");
        let path = format!("{}/create-preference/{}", BASE_PATH, user_infraction_id);

        let raw = self
            .client
            .request(&path, options)
            .await
            .map_err(|e| Self::log_failure(e, FUNCTION, "Payment preference creation"))?;

        let preference = validate::<PaymentPreference>(&raw).map_err(|e| {
            tracing::warn!(
                component = COMPONENT,
                function = FUNCTION,
                error = %e,
                "Payment preference does not match the expected schema"
            );
            AppError::Validation("Invalid payment preference data".to_string())
        })?;

        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            payment_id = preference.payment_id,
            "Payment preference created"
        );
        Ok(preference)
    }

    /// Current status of a payment.
    pub async fn get_status(&self, payment_id: i64) -> Result<PaymentStatus, AppError> {
        const FUNCTION: &str = "get_status";
        Self::require_positive(payment_id, "Invalid payment id", FUNCTION)?;

        tracing::debug!(component = COMPONENT, function = FUNCTION, payment_id, "Fetching payment status");

        let raw = self
            .client
            .get(&format!("{}/{}", BASE_PATH, payment_id))
            .await
            .map_err(|e| Self::log_failure(e, FUNCTION, "Payment status lookup"))?;

        let status = validate::<PaymentStatus>(&raw).map_err(|e| {
            tracing::warn!(
                component = COMPONENT,
                function = FUNCTION,
                error = %e,
                "Payment status does not match the expected schema"
            );
            AppError::Validation("Invalid payment status data".to_string())
        })?;

        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            status = ?status.status,
            "Payment status fetched"
        );
        Ok(status)
    }

    /// Payment history of a user. Invalid records are dropped.
    pub async fn get_user_payments(&self, user_id: i64) -> Result<Vec<UserPayment>, AppError> {
        const FUNCTION: &str = "get_user_payments";
        Self::require_positive(user_id, "Invalid user id", FUNCTION)?;

        tracing::debug!(component = COMPONENT, function = FUNCTION, user_id, "Fetching payment history");

        let raw = self
            .client
            .get(&format!("{}/user/{}", BASE_PATH, user_id))
            .await
            .map_err(|e| Self::log_failure(e, FUNCTION, "Payment history lookup"))?;

        let payments: Vec<UserPayment> = validate_list_lenient(&list_payload(raw), COMPONENT);
        tracing::debug!(
            component = COMPONENT,
            function = FUNCTION,
            "{} payments fetched",
            payments.len()
        );
        Ok(payments)
    }

    /// Health of the payment backend.
    pub async fn check_health(&self) -> Result<HealthReport, AppError> {
        const FUNCTION: &str = "check_health";
        tracing::debug!(component = COMPONENT, function = FUNCTION, "Checking payment health");

        let raw = self
            .client
            .get(&format!("{}/health", BASE_PATH))
            .await
            .map_err(|e| Self::log_failure(e, FUNCTION, "Payment health check"))?;

        match validate::<PaymentHealth>(&raw) {
            Ok(health) => {
                tracing::debug!(
                    component = COMPONENT,
                    function = FUNCTION,
                    status = %health.status,
                    "Health check completed"
                );
                Ok(HealthReport::Validated(health))
            }
            Err(e) => {
                tracing::warn!(
                    component = COMPONENT,
                    function = FUNCTION,
                    error = %e,
                    "Health document does not match the expected schema"
                );
                Ok(HealthReport::Raw(raw))
            }
        }
    }
}

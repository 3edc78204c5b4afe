//! Runtime schema validation of untrusted backend JSON.
//!
//! A schema is a typed record (`serde::Deserialize`) plus the value checks a
//! type cannot express (positive ids, URLs, e-mail syntax). Every entry point
//! returns `Result<_, AppError>`; a failure is always `AppError::Validation`.

use crate::errors::AppError;
use crate::models::{
    DocumentType, Infraction, PaymentAgreement, PaymentHealth, PaymentPreference, PaymentStatus,
    User, UserPayment,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Structural description of one response shape.
pub trait Schema: DeserializeOwned {
    /// Entity name used in error messages and logs.
    const NAME: &'static str;

    /// Value-level checks run after the shape deserialized.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Validates a single value against `T`.
pub fn validate<T: Schema>(raw: &Value) -> Result<T, AppError> {
    let parsed: T = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::Validation(format!("invalid {}: {}", T::NAME, e)))?;
    parsed
        .check()
        .map_err(|reason| AppError::Validation(format!("invalid {}: {}", T::NAME, reason)))?;
    Ok(parsed)
}

/// Validates a whole collection; one bad element fails the lot.
pub fn validate_list<T: Schema>(raw: &[Value]) -> Result<Vec<T>, AppError> {
    raw.iter()
        .enumerate()
        .map(|(index, item)| {
            validate::<T>(item).map_err(|e| match e {
                AppError::Validation(msg) => AppError::Validation(format!("[{}] {}", index, msg)),
                other => other,
            })
        })
        .collect()
}

/// Best-effort list validation.
///
/// When the whole collection does not validate, each element is validated on
/// its own and only the valid ones are kept. A warning records how many were
/// discarded. Never fails.
pub fn validate_list_lenient<T: Schema>(raw: &[Value], component: &'static str) -> Vec<T> {
    let mut valid = Vec::with_capacity(raw.len());
    let mut first_error: Option<String> = None;

    for item in raw {
        match validate::<T>(item) {
            Ok(parsed) => valid.push(parsed),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e.to_string());
                }
            }
        }
    }

    if let Some(error) = first_error {
        let discarded = raw.len() - valid.len();
        tracing::warn!(
            component,
            entity = T::NAME,
            discarded,
            total = raw.len(),
            first_error = %error,
            "Discarded {} of {} {} records that failed validation",
            discarded,
            raw.len(),
            T::NAME
        );
    }

    valid
}

fn check_positive(field: &str, value: i64) -> Result<(), String> {
    if value > 0 {
        Ok(())
    } else {
        Err(format!("{} must be a positive integer, got {}", field, value))
    }
}

fn check_url(field: &str, value: &str) -> Result<(), String> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| format!("{} is not a valid URL: {}", field, e))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

impl Schema for DocumentType {
    const NAME: &'static str = "document type";
}

impl Schema for User {
    const NAME: &'static str = "user";

    fn check(&self) -> Result<(), String> {
        match &self.email {
            Some(email) if !is_valid_email(email) => {
                Err(format!("email '{}' is not a valid address", email))
            }
            _ => Ok(()),
        }
    }
}

impl Schema for Infraction {
    const NAME: &'static str = "infraction";
}

impl Schema for PaymentAgreement {
    const NAME: &'static str = "payment agreement";
}

impl Schema for PaymentPreference {
    const NAME: &'static str = "payment preference";

    fn check(&self) -> Result<(), String> {
        check_url("initPoint", &self.init_point)?;
        check_url("sandboxInitPoint", &self.sandbox_init_point)?;
        if self.amount <= 0.0 {
            return Err(format!("amount must be positive, got {}", self.amount));
        }
        check_positive("paymentId", self.payment_id)
    }
}

impl Schema for PaymentStatus {
    const NAME: &'static str = "payment status";

    fn check(&self) -> Result<(), String> {
        check_positive("id", self.id)?;
        check_positive("infraction.id", self.infraction.id)
    }
}

impl Schema for UserPayment {
    const NAME: &'static str = "user payment";

    fn check(&self) -> Result<(), String> {
        check_positive("id", self.id)?;
        check_positive("infraction.id", self.infraction.id)
    }
}

impl Schema for PaymentHealth {
    const NAME: &'static str = "payment health";
}

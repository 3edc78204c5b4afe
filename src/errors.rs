use serde_json::Value;
use std::fmt;

/// Message shown when a request exceeds its timeout.
pub const TIMEOUT_MESSAGE: &str = "The request to the server timed out. Please try again.";

/// Generic message for an unreachable host before a module names the resource.
pub const UNREACHABLE_MESSAGE: &str = "Could not connect to the server";

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The host could not be reached.
    Network {
        /// User-facing message, usually naming the resource that failed.
        message: String,
        /// Transport detail reported by the HTTP stack.
        detail: String,
    },
    /// The request was cancelled by its timeout.
    Timeout,
    /// The server answered with a non-2xx status.
    Http {
        /// HTTP status code.
        status: u16,
        /// `message`/`error` from the body, or `HTTP <status>`.
        message: String,
        /// Parsed JSON body, when there was one.
        body: Option<Value>,
    },
    /// Response shape mismatch or an argument rejected before the call.
    Validation(String),
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// Internal error.
    InternalError(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network { message, detail } => write!(f, "{} ({})", message, detail),
            AppError::Timeout => write!(f, "{}", TIMEOUT_MESSAGE),
            AppError::Http { message, .. } => write!(f, "{}", message),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// True for transport failures, timeouts included.
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network { .. } | AppError::Timeout)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// Stable error code for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Network { .. } | AppError::Timeout => "NETWORK_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Http { .. } => "HTTP_ERROR",
            _ => "UNKNOWN_ERROR",
        }
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Replaces the message of a connectivity failure with a resource-specific one.
    ///
    /// Every other error is returned unchanged.
    pub fn on_unreachable(self, message: &str) -> Self {
        match self {
            AppError::Network { detail, .. } => AppError::Network {
                message: message.to_string(),
                detail,
            },
            other => other,
        }
    }

    /// Text suitable for an alert shown to the end user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network { message, .. } => message.clone(),
            AppError::Timeout => TIMEOUT_MESSAGE.to_string(),
            AppError::Validation(_) => {
                "The data received is not valid. Please try again.".to_string()
            }
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Http { message, .. } => message.clone(),
            AppError::ExternalApiError(_) | AppError::InternalError(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else if err.is_connect() {
            AppError::Network {
                message: UNREACHABLE_MESSAGE.to_string(),
                detail: err.to_string(),
            }
        } else {
            AppError::ExternalApiError(err.to_string())
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InternalError(format!("Failed to build URL: {}", err))
    }
}

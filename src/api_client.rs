use crate::config::Config;
use crate::errors::AppError;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Options for a single backend request.
///
/// Query parameters with a `None` or empty value are omitted from the URL.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub params: Vec<(String, Option<String>)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Overrides the client-wide timeout.
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    pub fn param<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        self.params
            .push((key.to_string(), value.map(|v| v.to_string())));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Builds the request URL for `path`.
///
/// Relative paths are prefixed with `host`; a path that already starts with
/// `http` is used as-is.
pub fn build_url(
    host: &str,
    path: &str,
    params: &[(String, Option<String>)],
) -> Result<Url, AppError> {
    let full = if path.starts_with("http") {
        path.to_string()
    } else {
        format!("{}{}", host.trim_end_matches('/'), path)
    };

    let mut url = Url::parse(&full)?;
    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(key, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some((key.as_str(), v)),
            _ => None,
        })
        .collect();

    if !present.is_empty() {
        url.query_pairs_mut().extend_pairs(present);
    }

    Ok(url)
}

/// Central HTTP client for the fines backend.
///
/// Applies the configured timeout, parses JSON bodies and normalizes
/// transport and status failures into `AppError`. It never retries.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    host: String,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a new `ApiClient` for `host`.
    ///
    /// # Arguments
    ///
    /// * `host` - Base URL prefixed to relative paths.
    /// * `timeout` - Default per-request timeout.
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            AppError::InternalError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            host: host.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.api_host.clone(), config.api_timeout)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Performs a request and returns the parsed body.
    ///
    /// # Returns
    ///
    /// * The JSON body when it parses, otherwise the raw text as a JSON
    ///   string, or `Value::Null` for an empty body.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, AppError> {
        let url = build_url(&self.host, path, &options.params)?;
        let timeout = options.timeout.unwrap_or(self.timeout);
        tracing::debug!("{} {}", options.method, url);

        let mut builder = self
            .client
            .request(options.method.clone(), url.clone())
            .timeout(timeout);

        if options.headers.is_empty() {
            builder = builder.header(reqwest::header::ACCEPT, "application/json");
        } else {
            for (name, value) in &options.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            let err = AppError::from(e);
            tracing::warn!("Request to {} failed: {}", url, err);
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(AppError::from)?;
        let json: Option<Value> = if text.is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!("{} returned {}: {}", url, status, message);
            return Err(AppError::Http {
                status: status.as_u16(),
                message,
                body: json,
            });
        }

        Ok(match json {
            Some(value) => value,
            None if text.is_empty() => Value::Null,
            None => Value::String(text),
        })
    }

    pub async fn get(&self, path: &str) -> Result<Value, AppError> {
        self.request(path, RequestOptions::get()).await
    }
}

fn error_message(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| {
        match body.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | Some(Value::Bool(false)) | None => None,
            Some(Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        }
    })
}

/// Extracts the list payload from a response.
///
/// Accepts a bare array or an object with a `data` array; anything else is
/// an empty list.
pub fn list_payload(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

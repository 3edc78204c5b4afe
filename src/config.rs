use std::time::Duration;

/// Backend host used when `API_HOST` is not configured.
pub const DEFAULT_API_HOST: &str = "http://172.30.3.135:7286";

/// Request timeout used when `API_TIMEOUT` is not configured (15s).
pub const DEFAULT_API_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL prefixed to every relative API path.
    pub api_host: String,
    /// Per-request timeout applied by the HTTP client.
    pub api_timeout: Duration,
    /// Enables debug-level logging when no `RUST_LOG` filter is set.
    pub debug_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            debug_mode: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads only `DEBUG_MODE`, so logging can be set up before the full load.
    ///
    /// Unset or unparseable values read as `false`.
    pub fn debug_mode_from_env() -> bool {
        dotenvy::dotenv().ok();
        debug_flag(std::env::var("DEBUG_MODE").ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Blank values are treated as unset and fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            api_host: var("API_HOST")
                .map(|host| {
                    let host = host.trim().to_string();
                    if !host.starts_with("http://") && !host.starts_with("https://") {
                        anyhow::bail!("API_HOST must start with http:// or https://");
                    }
                    Ok(host)
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            api_timeout: var("API_TIMEOUT")
                .map(|raw| {
                    let millis: u64 = raw.trim().parse().map_err(|_| {
                        anyhow::anyhow!("API_TIMEOUT must be a number of milliseconds")
                    })?;
                    if millis == 0 {
                        anyhow::bail!("API_TIMEOUT must be greater than zero");
                    }
                    Ok(Duration::from_millis(millis))
                })
                .transpose()?
                .unwrap_or_else(|| Duration::from_millis(DEFAULT_API_TIMEOUT_MS)),
            debug_mode: var("DEBUG_MODE")
                .map(|raw| parse_flag(&raw))
                .transpose()?
                .unwrap_or(false),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("API host: {}", config.api_host);
        tracing::debug!("API timeout: {}ms", config.api_timeout.as_millis());
        tracing::debug!("Debug mode: {}", config.debug_mode);

        Ok(config)
    }
}

fn debug_flag(raw: Option<String>) -> bool {
    raw.and_then(|value| parse_flag(&value).ok()).unwrap_or(false)
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => anyhow::bail!("DEBUG_MODE must be a boolean, got '{}'", other),
    }
}

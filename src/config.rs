use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LKG_MAX_AGE_MS: u64 = 300_000;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub feature_flag_api_url: String,
    pub api_key: String,
    pub lkg_max_age: chrono::Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let feature_flag_api_url = normalize_base_url(&required("FEATURE_FLAG_API_URL")?);
        let api_key = required("API_KEY")?;

        let port = match optional(&lookup, "PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a valid u16 number",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let lkg_max_age_ms = parse_millis(&lookup, "LKG_MAX_AGE_MS", DEFAULT_LKG_MAX_AGE_MS)?;
        let timeout_ms = parse_millis(&lookup, "FEATURE_FLAG_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;

        let lkg_max_age = i64::try_from(lkg_max_age_ms)
            .ok()
            .and_then(chrono::Duration::try_milliseconds)
            .ok_or(ConfigError::Invalid {
                name: "LKG_MAX_AGE_MS",
                expected: "a representable number of milliseconds",
                value: lkg_max_age_ms.to_string(),
            })?;

        Ok(Self {
            port,
            feature_flag_api_url,
            api_key,
            lkg_max_age,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_millis<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected: "a non-negative number of milliseconds",
            value: raw,
        }),
        None => Ok(default),
    }
}

// An empty `PORT=` line counts as unset, same as a missing one
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

/// Strips trailing slashes, then a trailing `/api/v1`, then a trailing `/api`.
/// The client appends the versioned path itself.
pub fn normalize_base_url(raw: &str) -> String {
    let mut url = raw.trim().trim_end_matches('/');

    for suffix in ["/api/v1", "/api"] {
        url = strip_suffix_ignore_case(url, suffix);
    }

    url.to_string()
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> &'a str {
    let Some(cut) = value.len().checked_sub(suffix.len()) else {
        return value;
    };

    if value.is_char_boundary(cut) && value[cut..].eq_ignore_ascii_case(suffix) {
        &value[..cut]
    } else {
        value
    }
}

use std::time::Duration;

use crate::runtime::retry::{
    InvalidRetryPolicy, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS,
};

pub const LOCATIONS_TABLE_ENV: &str = "LOCATIONS_TABLE";
pub const SEED_MAX_ATTEMPTS_ENV: &str = "SEED_MAX_ATTEMPTS";
pub const SEED_BASE_DELAY_MS_ENV: &str = "SEED_BASE_DELAY_MS";
pub const DYNAMODB_ENDPOINT_URL_ENV: &str = "DYNAMODB_ENDPOINT_URL";
pub const LOG_FILTER_ENV: &str = "LOCATIONS_LOG";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings read once at cold start and shared by every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub locations_table: Option<String>,
    pub retry_policy: RetryPolicy,
    pub dynamodb_endpoint_url: Option<String>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let max_attempts = match non_blank(SEED_MAX_ATTEMPTS_ENV) {
            Some(value) => parse_number(SEED_MAX_ATTEMPTS_ENV, &value)?,
            None => DEFAULT_MAX_ATTEMPTS,
        };
        let base_delay = match non_blank(SEED_BASE_DELAY_MS_ENV) {
            Some(value) => Duration::from_millis(parse_number(SEED_BASE_DELAY_MS_ENV, &value)?),
            None => DEFAULT_BASE_DELAY,
        };
        let retry_policy = RetryPolicy::new(max_attempts, base_delay).map_err(|error| {
            let (key, value) = match error {
                InvalidRetryPolicy::ZeroAttempts => {
                    (SEED_MAX_ATTEMPTS_ENV, max_attempts.to_string())
                }
                InvalidRetryPolicy::ZeroBaseDelay => {
                    (SEED_BASE_DELAY_MS_ENV, base_delay.as_millis().to_string())
                }
            };
            ConfigError::Invalid {
                key,
                value,
                reason: error.to_string(),
            }
        })?;

        Ok(Self {
            locations_table: non_blank(LOCATIONS_TABLE_ENV).map(|value| value.trim().to_string()),
            retry_policy,
            dynamodb_endpoint_url: non_blank(DYNAMODB_ENDPOINT_URL_ENV),
        })
    }

    pub fn require_locations_table(&self) -> Result<&str, ConfigError> {
        self.locations_table
            .as_deref()
            .ok_or(ConfigError::Missing(LOCATIONS_TABLE_ENV))
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|error: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: error.to_string(),
    })
}

//! Environment-driven configuration
//!
//! The proxy is configured entirely through environment variables. They are
//! resolved once at startup into an immutable [`Configuration`]; nothing
//! downstream reads the environment again.

use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

pub const BUCKET_NAME: &str = "BUCKET_NAME";
pub const ENDPOINT: &str = "ENDPOINT";
pub const AUTHENTICATION_TYPE: &str = "AUTHENTICATION_TYPE";
pub const REGION: &str = "REGION";
pub const ACCESS_KEY_ID: &str = "ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "SECRET_ACCESS_KEY";
pub const API_KEY: &str = "API_KEY";
pub const SERVICE_INSTANCE_ID: &str = "SERVICE_INSTANCE_ID";
pub const IAM_TOKEN_URL: &str = "IAM_TOKEN_URL";
pub const PORT: &str = "PORT";
pub const SVC_NAME: &str = "SVC_NAME";
pub const APP_NAME_VER: &str = "APP_NAME_VER";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// Resolved process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub bucket: String,
    pub endpoint: String,
    pub credentials: Credentials,
    pub port: u16,
    pub log_tags: LogTags,
    /// Where IAM API keys are exchanged for bearer tokens
    pub iam_token_url: String,
}

/// Backend credentials, one variant per authentication mode
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Static access-key/secret-key pair (`AUTHENTICATION_TYPE=hmac`)
    Hmac {
        region: String,
        access_key_id: String,
        secret_access_key: String,
    },
    /// API key exchanged for short-lived tokens (`AUTHENTICATION_TYPE=iam`)
    Iam {
        api_key: String,
        service_instance_id: String,
    },
}

impl Credentials {
    pub fn mode(&self) -> &'static str {
        match self {
            Credentials::Hmac { .. } => "hmac",
            Credentials::Iam { .. } => "iam",
        }
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Hmac {
                region,
                access_key_id,
                ..
            } => f
                .debug_struct("Hmac")
                .field("region", region)
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
            Credentials::Iam {
                service_instance_id,
                ..
            } => f
                .debug_struct("Iam")
                .field("api_key", &"<redacted>")
                .field("service_instance_id", service_instance_id)
                .finish(),
        }
    }
}

/// Static fields attached to every log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTags {
    pub app: String,
    pub service: String,
}

impl Default for LogTags {
    fn default() -> Self {
        Self {
            app: concat!(env!("CARGO_PKG_NAME"), "@", env!("CARGO_PKG_VERSION")).to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Configuration errors; any of these aborts startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Unknown authentication mode: '{0}' (expected 'hmac' or 'iam')")]
    UnknownAuthenticationMode(String),
}

impl Configuration {
    /// Resolve the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        resolve(&env)
    }
}

/// Resolve a configuration from a map of environment variables.
///
/// Empty values are treated as absent. `PORT` falls back to
/// [`DEFAULT_PORT`] when absent or unparsable.
pub fn resolve(env: &HashMap<String, String>) -> Result<Configuration, ConfigError> {
    let bucket = required(env, BUCKET_NAME)?;
    let endpoint = required(env, ENDPOINT)?;
    let mode = required(env, AUTHENTICATION_TYPE)?;

    let credentials = match mode.to_ascii_lowercase().as_str() {
        "hmac" => Credentials::Hmac {
            region: required(env, REGION)?,
            access_key_id: required(env, ACCESS_KEY_ID)?,
            secret_access_key: required(env, SECRET_ACCESS_KEY)?,
        },
        "iam" => Credentials::Iam {
            api_key: required(env, API_KEY)?,
            service_instance_id: required(env, SERVICE_INSTANCE_ID)?,
        },
        _ => return Err(ConfigError::UnknownAuthenticationMode(mode)),
    };

    let port = match optional(env, PORT).map(|raw| raw.parse::<u16>()) {
        Some(Ok(port)) => port,
        Some(Err(_)) => {
            info!("{} is not a valid port, defaulting to {}", PORT, DEFAULT_PORT);
            DEFAULT_PORT
        }
        None => {
            info!("{} not set, defaulting to {}", PORT, DEFAULT_PORT);
            DEFAULT_PORT
        }
    };

    let defaults = LogTags::default();
    let log_tags = LogTags {
        app: optional(env, APP_NAME_VER).unwrap_or(defaults.app),
        service: optional(env, SVC_NAME).unwrap_or(defaults.service),
    };

    Ok(Configuration {
        bucket,
        endpoint,
        credentials,
        port,
        log_tags,
        iam_token_url: optional(env, IAM_TOKEN_URL)
            .unwrap_or_else(|| DEFAULT_IAM_TOKEN_URL.to_string()),
    })
}

fn optional(env: &HashMap<String, String>, name: &str) -> Option<String> {
    env.get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required(env: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    optional(env, name).ok_or(ConfigError::MissingConfiguration(name))
}

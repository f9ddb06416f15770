// Error types for twinprobe
//
// LoginError is fatal for the affected identity, NavigationError is recovered
// per locator by the prober and propagates everywhere else.

use std::time::Duration;
use thiserror::Error;

/// Failure to establish an authenticated session.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("login page {url} has no form")]
    FormNotFound { url: String },

    #[error("login form at {url} has no field named '{field}'")]
    MissingField { url: String, field: String },

    #[error("login submission rejected with status {status}")]
    Rejected { status: u16 },

    #[error("login form still present after submission, no session established")]
    NotEstablished,

    #[error("navigation failed during login: {0}")]
    Navigation(#[from] NavigationError),
}

/// Transport, timeout or driver fault while loading a page.
#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("navigation to {url} timed out after {duration:?}")]
    Timeout { url: String, duration: Duration },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("browser fault: {0}")]
    Driver(String),
}

impl NavigationError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            NavigationError::Timeout {
                url: url.to_string(),
                duration: timeout,
            }
        } else {
            NavigationError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Problems with the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config value '{0}' must not be empty")]
    Empty(String),

    #[error("config value '{field}' is not an absolute http(s) url: {value}")]
    InvalidUrl { field: String, value: String },

    #[error("identity labels must differ, both are '{0}'")]
    DuplicateLabel(String),
}

/// Top-level error for a whole analysis run.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("login as '{identity}' failed: {source}")]
    Login {
        identity: String,
        #[source]
        source: LoginError,
    },

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

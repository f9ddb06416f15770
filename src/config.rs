// Run configuration for twinprobe
// Supplied wholesale as a JSON file before the pipeline starts

use crate::errors::ConfigError;
use crate::models::Identity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default denial vocabulary, matched against the lower-cased page body.
pub const DEFAULT_DENIAL_KEYWORDS: &[&str] =
    &["403 forbidden", "404 not found", "login", "signin", "log in"];

fn default_timeout_secs() -> u64 {
    30
}

fn default_denial_keywords() -> Vec<String> {
    DEFAULT_DENIAL_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("twinprobe/{}", env!("CARGO_PKG_VERSION"))
}

/// Knobs for navigation and response classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_denial_keywords")]
    pub denial_keywords: Vec<String>,
    /// Treat a same-scope redirect to a different address as a denial.
    #[serde(default = "default_true")]
    pub redirect_denial: bool,
    /// Treat a final 401/403 status as a denial before looking at the body.
    #[serde(default)]
    pub deny_on_status: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            denial_keywords: default_denial_keywords(),
            redirect_denial: true,
            deny_on_status: false,
            user_agent: default_user_agent(),
        }
    }
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Everything one analysis run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub identity_a: Identity,
    pub identity_b: Identity,
    /// Post-login page of identity A; its host is A's scope domain.
    pub origin_a: String,
    pub origin_b: String,
    #[serde(default)]
    pub probe: ProbeSettings,
}

impl ScanConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Non-emptiness and url-shape checks. Nothing is fetched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_identity("identity_a", &self.identity_a)?;
        validate_identity("identity_b", &self.identity_b)?;
        validate_url("origin_a", &self.origin_a)?;
        validate_url("origin_b", &self.origin_b)?;

        if self.identity_a.label == self.identity_b.label {
            return Err(ConfigError::DuplicateLabel(self.identity_a.label.clone()));
        }
        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::Empty("probe.timeout_secs".to_string()));
        }
        Ok(())
    }
}

fn validate_identity(prefix: &str, identity: &Identity) -> Result<(), ConfigError> {
    if identity.label.trim().is_empty() {
        return Err(ConfigError::Empty(format!("{}.label", prefix)));
    }
    validate_url(&format!("{}.login_url", prefix), &identity.login_url)?;
    if identity.credentials.is_empty() {
        return Err(ConfigError::Empty(format!("{}.credentials", prefix)));
    }
    for (i, cred) in identity.credentials.iter().enumerate() {
        if cred.field.trim().is_empty() {
            return Err(ConfigError::Empty(format!("{}.credentials[{}].field", prefix, i)));
        }
        if cred.value.is_empty() {
            return Err(ConfigError::Empty(format!("{}.credentials[{}].value", prefix, i)));
        }
    }
    Ok(())
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(field.to_string()));
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

//! Client configuration
//!
//! Read from the environment:
//!
//! | variable                | default                                                     |
//! |-------------------------|-------------------------------------------------------------|
//! | `STUDY_BASE_URL`        | `http://localhost:5000`                                     |
//! | `STUDY_TIMEOUT_SECS`    | `30`                                                        |
//! | `STUDY_COMPLETION_CODE` | unset (no platform redirect)                                |
//! | `STUDY_COMPLETION_URL`  | `https://app.prolific.com/submissions/complete?cc={code}`   |
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const BASE_URL_VAR: &str = "STUDY_BASE_URL";
pub const TIMEOUT_VAR: &str = "STUDY_TIMEOUT_SECS";
pub const COMPLETION_CODE_VAR: &str = "STUDY_COMPLETION_CODE";
pub const COMPLETION_URL_VAR: &str = "STUDY_COMPLETION_URL";

/// Placeholder replaced by the completion code in the completion URL
pub const CODE_PLACEHOLDER: &str = "{code}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server root; endpoints are resolved below it
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Redirect target after a platform-recruited session, with a
    /// `{code}` placeholder
    pub completion_url: String,

    /// Platform completion code; `None` disables the redirect
    pub completion_code: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            request_timeout: Duration::from_secs(30),
            completion_url: format!("https://app.prolific.com/submissions/complete?cc={CODE_PLACEHOLDER}"),
            completion_code: None,
        }
    }
}

impl ClientConfig {
    /// Configuration from the process environment
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base) = lookup(BASE_URL_VAR) {
            config.base_url = base;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ClientError::Config {
                key: TIMEOUT_VAR,
                message: format!("expected whole seconds, got {raw:?}"),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = lookup(COMPLETION_URL_VAR) {
            config.completion_url = url;
        }
        config.completion_code = lookup(COMPLETION_CODE_VAR).filter(|c| !c.trim().is_empty());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        self.base_url()?;
        if self.request_timeout.is_zero() {
            return Err(ClientError::Config {
                key: TIMEOUT_VAR,
                message: "timeout must be positive".into(),
            });
        }
        if !self.completion_url.contains(CODE_PLACEHOLDER) {
            return Err(ClientError::Config {
                key: COMPLETION_URL_VAR,
                message: format!("missing {CODE_PLACEHOLDER} placeholder"),
            });
        }
        Ok(())
    }

    /// Parsed server root
    pub fn base_url(&self) -> Result<Url, ClientError> {
        let url = Url::parse(&self.base_url).map_err(|e| ClientError::Config {
            key: BASE_URL_VAR,
            message: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ClientError::Config {
                key: BASE_URL_VAR,
                message: format!("{} cannot carry a path", self.base_url),
            });
        }
        Ok(url)
    }
}

//! HTTP client side of the projection lasso study
//!
//! Implements the core's [`StudyBackend`](study_core::StudyBackend) over the
//! study server's REST endpoints, reads client settings from the
//! environment, parses recruiting-platform parameters and decides where a
//! participant goes after submitting.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod prolific;

pub use self::config::ClientConfig;
pub use self::error::ClientError;
pub use self::http::HttpBackend;
pub use self::prolific::{completion_target, CompletionTarget, FromQuery};

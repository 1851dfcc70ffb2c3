//! Recruiting-platform integration
//!
//! Participants recruited through Prolific arrive with `PROLIFIC_PID`,
//! `STUDY_ID` and `SESSION_ID` query parameters. They are carried in the
//! submission and, once the results are stored, decide whether the
//! participant is redirected back to the platform or shown the thank-you
//! view.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, warn};
use reqwest::Url;
use url::form_urlencoded;

use study_core::{ParticipantCode, ProlificContext};

use crate::config::{ClientConfig, CODE_PLACEHOLDER};

pub const PROLIFIC_PID: &str = "PROLIFIC_PID";
pub const STUDY_ID: &str = "STUDY_ID";
pub const SESSION_ID: &str = "SESSION_ID";

/// Construction from a page query string
pub trait FromQuery: Sized {
    /// Parse `a=b&c=d` (with or without a leading `?`)
    fn from_query(query: &str) -> Self;

    /// Parse the query of a full URL
    fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }
}

impl FromQuery for ProlificContext {
    fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut context = ProlificContext::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()).into_owned() {
            let value = Some(value).filter(|v| !v.is_empty());
            match key.as_str() {
                PROLIFIC_PID => context.prolific_pid = value,
                STUDY_ID => context.study_id = value,
                SESSION_ID => context.session_id = value,
                _ => {}
            }
        }
        debug!("platform context present: {}", context.is_present());
        context
    }
}

/// Where the participant goes after a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionTarget {
    /// Back to the recruiting platform
    Redirect(Url),

    /// Static thank-you page showing the participant code
    ThankYou { participant_code: ParticipantCode },
}

/// Redirect platform participants when a completion code is configured,
/// otherwise show the thank-you view
pub fn completion_target(
    prolific: Option<&ProlificContext>,
    participant_code: ParticipantCode,
    config: &ClientConfig,
) -> CompletionTarget {
    let thank_you = CompletionTarget::ThankYou { participant_code };
    if !prolific.is_some_and(ProlificContext::is_present) {
        return thank_you;
    }
    let Some(code) = config.completion_code.as_deref() else {
        warn!("platform participant but no completion code configured");
        return thank_you;
    };

    let code: String = form_urlencoded::byte_serialize(code.as_bytes()).collect();
    match Url::parse(&config.completion_url.replace(CODE_PLACEHOLDER, &code)) {
        Ok(url) => CompletionTarget::Redirect(url),
        Err(e) => {
            warn!("completion URL is invalid: {}", e);
            thank_you
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> ParticipantCode {
        ParticipantCode::new(424_242).unwrap()
    }

    #[test]
    fn test_from_query_reads_platform_ids() {
        let context = ProlificContext::from_query("?PROLIFIC_PID=abc%20123&STUDY_ID=s9&SESSION_ID=&other=1");
        assert_eq!(context.prolific_pid.as_deref(), Some("abc 123"));
        assert_eq!(context.study_id.as_deref(), Some("s9"));
        assert_eq!(context.session_id, None);
        assert!(context.is_present());

        assert!(!ProlificContext::from_query("").is_present());
        assert!(!ProlificContext::from_query("STUDY_ID=s9").is_present());
    }

    #[test]
    fn test_from_url() {
        let url = Url::parse("https://study.example.org/?PROLIFIC_PID=p1").unwrap();
        assert_eq!(ProlificContext::from_url(&url).prolific_pid.as_deref(), Some("p1"));
    }

    #[test]
    fn test_redirects_platform_participants() {
        let config = ClientConfig {
            completion_code: Some("CXY 7".into()),
            ..ClientConfig::default()
        };
        let context = ProlificContext::from_query("PROLIFIC_PID=p1");
        match completion_target(Some(&context), code(), &config) {
            CompletionTarget::Redirect(url) => {
                assert_eq!(url.as_str(), "https://app.prolific.com/submissions/complete?cc=CXY+7");
            }
            other => panic!("expected a redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_completion_code_is_form_encoded() {
        let config = ClientConfig {
            completion_code: Some("A&B=C/ü".into()),
            ..ClientConfig::default()
        };
        let context = ProlificContext::from_query("PROLIFIC_PID=p1");
        let CompletionTarget::Redirect(url) = completion_target(Some(&context), code(), &config) else {
            panic!("expected a redirect");
        };
        assert_eq!(url.query(), Some("cc=A%26B%3DC%2F%C3%BC"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("cc".to_string(), "A&B=C/ü".to_string())]);
    }

    #[test]
    fn test_thank_you_otherwise() {
        let with_code = ClientConfig {
            completion_code: Some("CXY7".into()),
            ..ClientConfig::default()
        };
        let expected = CompletionTarget::ThankYou { participant_code: code() };

        assert_eq!(completion_target(None, code(), &with_code), expected);
        assert_eq!(
            completion_target(Some(&ProlificContext::default()), code(), &with_code),
            expected
        );

        let context = ProlificContext::from_query("PROLIFIC_PID=p1");
        assert_eq!(completion_target(Some(&context), code(), &ClientConfig::default()), expected);
    }
}

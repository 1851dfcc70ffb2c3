//! Final submission payload
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ResultLog, ResultRecord};

/// Free-form survey answers keyed by question
pub type Survey = serde_json::Map<String, serde_json::Value>;

/// Six-digit code shown to the participant and stored with their results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantCode(u32);

impl ParticipantCode {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    /// Uniform draw from `MIN..=MAX`
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    /// `None` unless `value` has exactly six digits
    pub fn new(value: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticipantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recruiting-platform identifiers passed in on the study URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProlificContext {
    pub prolific_pid: Option<String>,
    pub study_id: Option<String>,
    pub session_id: Option<String>,
}

impl ProlificContext {
    /// Whether the participant arrived through the platform
    pub fn is_present(&self) -> bool {
        self.prolific_pid.as_deref().is_some_and(|pid| !pid.is_empty())
    }
}

/// Body of the submission request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub results: Vec<ResultRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey: Option<Survey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prolific: Option<ProlificContext>,

    /// Moment the study was completed
    pub timestamp: DateTime<Utc>,

    pub participant_code: ParticipantCode,
}

impl Submission {
    pub fn new(log: &ResultLog, participant_code: ParticipantCode, timestamp: DateTime<Utc>) -> Self {
        Self {
            results: log.records().to_vec(),
            survey: None,
            prolific: None,
            timestamp,
            participant_code,
        }
    }

    pub fn with_survey(mut self, survey: Option<Survey>) -> Self {
        self.survey = survey;
        self
    }

    pub fn with_prolific(mut self, prolific: Option<ProlificContext>) -> Self {
        self.prolific = prolific.filter(ProlificContext::is_present);
        self
    }
}

//! Crate-level error type
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use thiserror::Error;

use crate::config::ConfigError;
use crate::record::RecordError;
use crate::study::{RankingError, SequencerError, TrialDataError, UnknownTaskKind};

/// Any failure surfaced by the study core
#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error(transparent)]
    TrialData(#[from] TrialDataError),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    TaskKind(#[from] UnknownTaskKind),

    /// Catalog or trial data could not be fetched
    #[error("Backend request failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StudyError {
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StudyError::Backend(Box::new(error))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, StudyError::Backend(_))
    }
}

/// Result type for study operations
pub type StudyResult<T> = Result<T, StudyError>;

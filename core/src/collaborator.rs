//! Collaborator contracts
//!
//! The core never performs I/O itself. Data access and submission go through
//! a [`StudyBackend`]; everything the participant sees goes to a
//! [`Presenter`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use async_trait::async_trait;

use crate::record::Submission;
use crate::study::{Catalog, Effect, TrialData};

/// Remote data access and result storage
#[async_trait]
pub trait StudyBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `dataset -> [projection]`, fetched once at study start
    async fn catalog(&self) -> Result<Catalog, Self::Error>;

    /// Points of one projection of one dataset
    async fn trial_data(&self, dataset: &str, projection: &str) -> Result<TrialData, Self::Error>;

    /// Store the final results. Success carries no payload.
    async fn submit(&self, submission: &Submission) -> Result<(), Self::Error>;
}

/// Synchronous UI sink
pub trait Presenter: Send {
    fn present(&mut self, effect: &Effect);
}

impl<F> Presenter for F
where
    F: FnMut(&Effect) + Send,
{
    fn present(&mut self, effect: &Effect) {
        self(effect)
    }
}

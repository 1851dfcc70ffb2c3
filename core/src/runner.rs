//! Async study runner
//!
//! Feeds events into the [`SequencerState`], performs the effects that need a
//! backend (`FetchTrial`, `FetchThumbnail`, `Submit`), turns their completions
//! back into events and hands every other effect to the presenter. Exactly one
//! backend call is in flight at a time.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::{debug, error, warn};

use crate::collaborator::{Presenter, StudyBackend};
use crate::error::{StudyError, StudyResult};
use crate::study::{Clock, Effect, SequencerState, StudyEvent};

/// Drives one participant session
pub struct StudyRunner<B, P, C> {
    state: SequencerState,
    backend: B,
    presenter: P,
    clock: C,
}

impl<B, P, C> StudyRunner<B, P, C>
where
    B: StudyBackend,
    P: Presenter,
    C: Clock,
{
    pub fn new(state: SequencerState, backend: B, presenter: P, clock: C) -> Self {
        Self {
            state,
            backend,
            presenter,
            clock,
        }
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_parts(self) -> (SequencerState, B, P) {
        (self.state, self.backend, self.presenter)
    }

    /// Fetch the catalog and show the welcome page
    pub async fn start(&mut self) -> StudyResult<()> {
        let catalog = self.backend.catalog().await.map_err(|e| {
            error!("catalog request failed: {}", e);
            StudyError::backend(e)
        })?;
        debug!("catalog loaded with {} datasets", catalog.0.len());
        self.dispatch(StudyEvent::CatalogLoaded(catalog)).await
    }

    /// Apply a participant event and everything it sets in motion
    ///
    /// Catalog and trial fetch failures end the call with
    /// [`StudyError::Backend`]. A missing thumbnail only leaves its plot empty.
    pub async fn dispatch(&mut self, event: StudyEvent) -> StudyResult<()> {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let effects = self.state.handle(event, self.clock.now())?;
            for effect in effects {
                match effect {
                    Effect::FetchTrial(trial) => {
                        let data = self
                            .backend
                            .trial_data(&trial.dataset, &trial.projection)
                            .await
                            .map_err(|e| {
                                error!("trial data for {}/{} failed: {}", trial.dataset, trial.projection, e);
                                StudyError::backend(e)
                            })?;
                        queue.push_back(StudyEvent::TrialDataLoaded { trial, data });
                    }
                    Effect::FetchThumbnail { dataset, projection } => {
                        match self.backend.trial_data(&dataset, &projection).await {
                            Ok(data) => queue.push_back(StudyEvent::ThumbnailLoaded { dataset, projection, data }),
                            Err(e) => warn!("thumbnail for {}/{} unavailable: {}", dataset, projection, e),
                        }
                    }
                    Effect::Submit(submission) => match self.backend.submit(&submission).await {
                        Ok(()) => queue.push_back(StudyEvent::SubmissionSucceeded),
                        Err(e) => {
                            warn!("submission failed: {}", e);
                            queue.push_back(StudyEvent::SubmissionFailed { reason: e.to_string() });
                        }
                    },
                    other => self.presenter.present(&other),
                }
            }
        }
        Ok(())
    }
}

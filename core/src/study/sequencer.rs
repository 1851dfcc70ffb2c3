//! Study sequencer state machine
//!
//! A single owned [`SequencerState`] drives a participant through the study:
//!
//! ```text
//! Loading -> Welcome -> BlockIntro(b) -> SanityCheck(b) -> Trial(b, i) ... -> BlockIntro(b + 1)
//!        ... -> FinalRanking(page) -> Submitting -> Done
//!                                        ^   |
//!                                        |   v
//!                                   SubmissionFailed
//! ```
//!
//! [`SequencerState::handle`] is a pure transition: it takes one
//! [`StudyEvent`] and the current monotonic time, mutates the state and
//! returns the [`Effect`]s the surrounding runner must carry out (render a
//! scene, fetch trial data, submit). Nothing in here performs I/O or reads a
//! clock, and all randomness comes from a seedable generator owned by the
//! state.
//!
//! Pausing is orthogonal to the phase. While paused, pointer input and
//! participant advances are ignored; fetch and submission completions are
//! still accepted.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, EmptySelectionPolicy, StudyConfig};
use crate::geometry::Polygon;
use crate::record::{ParticipantCode, ProlificContext, RecordError, ResultLog, Submission, Survey};
use crate::scene::{Point, Scene};
use crate::selection::{CommitOutcome, GroupStyle, LassoSelector, PointerEvent, SelectionState};
use crate::study::catalog::{Catalog, Trial, TrialData, TrialDataError, TrialProgram};
use crate::study::clock::{is_resume_key, PauseClock, Stopwatch};
use crate::study::progress::{ProgressDisplay, StudyProgress};
use crate::study::ranking::{RankingPage, RankingPhase};
use crate::study::task::{HighlightRule, TaskKind};

/// Sequencer errors: events that make no sense in the current phase, or
/// payloads that cannot be used
#[derive(Debug, Error)]
pub enum SequencerError {
    /// Event not accepted in the current phase
    #[error("Event {event} is not valid in phase {phase}")]
    UnexpectedEvent { event: &'static str, phase: Phase },

    /// Trial data arrived for a trial other than the one requested
    #[error("Received data for {received_dataset}/{received_projection}, expected {expected_dataset}/{expected_projection}")]
    StaleTrialData {
        expected_dataset: String,
        expected_projection: String,
        received_dataset: String,
        received_projection: String,
    },

    /// Unusable trial payload
    #[error("Invalid trial data: {0}")]
    TrialData(#[from] TrialDataError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The result log broke one of its invariants
    #[error("Inconsistent result log: {0}")]
    Record(#[from] RecordError),
}

/// Result type for sequencer transitions
pub type SequencerResult<T> = Result<T, SequencerError>;

/// Loading state of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialStage {
    /// Data requested, nothing rendered yet
    Fetching,

    /// Scene rendered, lasso active, stopwatch running
    Active,
}

/// Sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Loading,
    Welcome,
    BlockIntro { block: usize },
    SanityCheck { block: usize },
    Trial { block: usize, index: usize, stage: TrialStage },
    FinalRanking { page: usize },
    Submitting,
    SubmissionFailed,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Loading => write!(f, "Loading"),
            Phase::Welcome => write!(f, "Welcome"),
            Phase::BlockIntro { block } => write!(f, "BlockIntro({block})"),
            Phase::SanityCheck { block } => write!(f, "SanityCheck({block})"),
            Phase::Trial { block, index, stage } => write!(f, "Trial({block}, {index}, {stage:?})"),
            Phase::FinalRanking { page } => write!(f, "FinalRanking({page})"),
            Phase::Submitting => write!(f, "Submitting"),
            Phase::SubmissionFailed => write!(f, "SubmissionFailed"),
            Phase::Done => write!(f, "Done"),
        }
    }
}

/// Inputs to the sequencer
#[derive(Debug, Clone, PartialEq)]
pub enum StudyEvent {
    /// Catalog fetched at study start
    CatalogLoaded(Catalog),

    /// Participant pressed the advance control
    Advance,

    /// Data for the trial requested by the last `FetchTrial`
    TrialDataLoaded { trial: Trial, data: TrialData },

    Pointer(PointerEvent),

    Pause,

    /// Overlay clicked
    Resume,

    /// Key pressed while the pause overlay is visible
    ResumeKey(String),

    /// Re-render the current scene with an empty selection
    Reset,

    /// Points for a ranking thumbnail requested by `FetchThumbnail`
    ThumbnailLoaded {
        dataset: String,
        projection: String,
        data: TrialData,
    },

    /// Rank (or clear, with `None`) a projection on the current ranking page
    Rank { projection: String, rank: Option<u8> },

    SubmissionSucceeded,

    SubmissionFailed { reason: String },

    AttachSurvey(Survey),

    AttachProlific(ProlificContext),
}

impl StudyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StudyEvent::CatalogLoaded(_) => "CatalogLoaded",
            StudyEvent::Advance => "Advance",
            StudyEvent::TrialDataLoaded { .. } => "TrialDataLoaded",
            StudyEvent::Pointer(_) => "Pointer",
            StudyEvent::Pause => "Pause",
            StudyEvent::Resume => "Resume",
            StudyEvent::ResumeKey(_) => "ResumeKey",
            StudyEvent::Reset => "Reset",
            StudyEvent::ThumbnailLoaded { .. } => "ThumbnailLoaded",
            StudyEvent::Rank { .. } => "Rank",
            StudyEvent::SubmissionSucceeded => "SubmissionSucceeded",
            StudyEvent::SubmissionFailed { .. } => "SubmissionFailed",
            StudyEvent::AttachSurvey(_) => "AttachSurvey",
            StudyEvent::AttachProlific(_) => "AttachProlific",
        }
    }
}

/// Blocking messages shown to the participant. These are recoverable input
/// problems, never faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Advance with nothing selected
    EmptySelection,

    /// Wrong answer to a sanity check; the selection has been cleared
    SanityFailed { task: TaskKind },

    /// Rank rejected by the ranking page
    RankRejected { message: String },

    /// Submission failed; the participant may retry
    SubmissionFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EmptySelection => write!(f, "Please make a selection before continuing."),
            Notice::SanityFailed { .. } => {
                write!(f, "That selection is not correct. Please read the instructions and try again.")
            }
            Notice::RankRejected { message } => write!(f, "{message}"),
            Notice::SubmissionFailed { reason } => {
                write!(f, "Submitting your results failed ({reason}). Please try again.")
            }
        }
    }
}

/// Outputs the runner carries out, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowWelcome,

    ShowBlockIntro {
        task: TaskKind,
        title: &'static str,
        instructions: &'static str,
    },

    /// Draw a scene; the previous selection outline is gone
    RenderScene(Scene),

    /// Request data for a trial; answer with `TrialDataLoaded`
    FetchTrial(Trial),

    /// Draw the lasso outline from SVG path data, or hide it with `None`
    LassoOutline(Option<String>),

    /// Recolour every selection group
    Recolor(Vec<GroupStyle>),

    Notice(Notice),

    ShowRankingPage(RankingPage),

    /// Request the points of one projection on the open ranking page; answer
    /// with `ThumbnailLoaded`
    FetchThumbnail { dataset: String, projection: String },

    /// Draw a thumbnail next to the rank selector of `projection`
    ShowThumbnail {
        dataset: String,
        projection: String,
        scene: Scene,
    },

    /// Send the submission; answer with `SubmissionSucceeded` or
    /// `SubmissionFailed`
    Submit(Submission),

    Progress(ProgressDisplay),

    Completed {
        participant_code: ParticipantCode,
        prolific: Option<ProlificContext>,
    },

    PauseOverlay { visible: bool },
}

/// Scene currently on screen, with its cached hit-test points
#[derive(Debug, Clone)]
struct ActiveScene {
    scene: Scene,
    points: Vec<Point>,
}

impl ActiveScene {
    fn new(scene: Scene) -> Self {
        let points = scene.points();
        Self { scene, points }
    }
}

/// The whole study, owned in one value
#[derive(Debug, Clone)]
pub struct SequencerState {
    config: StudyConfig,
    phase: Phase,
    rng: ChaCha20Rng,
    program: TrialProgram,
    progress: StudyProgress,
    lasso: LassoSelector,
    active: Option<ActiveScene>,
    pending_trial: Option<Trial>,
    stopwatch: Option<Stopwatch>,
    pause: PauseClock,
    ranking: Option<RankingPhase>,
    log: ResultLog,
    participant_code: ParticipantCode,
    survey: Option<Survey>,
    prolific: Option<ProlificContext>,
    submission: Option<Submission>,
    wall_origin: DateTime<Utc>,
    last_event_at: Duration,
}

impl SequencerState {
    /// Fresh study in the `Loading` phase. The runner fetches the catalog and
    /// feeds it back as `CatalogLoaded`.
    pub fn new(config: StudyConfig) -> SequencerResult<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        let participant_code = ParticipantCode::generate(&mut rng);
        debug!("sequencer created, participant code {}", participant_code);

        Ok(Self {
            config,
            phase: Phase::Loading,
            rng,
            program: TrialProgram::default(),
            progress: StudyProgress::default(),
            lasso: LassoSelector::new(TaskKind::E1.selection_mode()),
            active: None,
            pending_trial: None,
            stopwatch: None,
            pause: PauseClock::new(),
            ranking: None,
            log: ResultLog::new(),
            participant_code,
            survey: None,
            prolific: None,
            submission: None,
            wall_origin: Utc::now(),
            last_event_at: Duration::ZERO,
        })
    }

    /// Anchor monotonic time to a wall-clock instant for the submission
    /// timestamp
    pub fn with_wall_origin(mut self, origin: DateTime<Utc>) -> Self {
        self.wall_origin = origin;
        self
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> StudyProgress {
        self.progress
    }

    pub fn program(&self) -> &TrialProgram {
        &self.program
    }

    pub fn selection(&self) -> &SelectionState {
        self.lasso.selection()
    }

    pub fn lasso(&self) -> &LassoSelector {
        &self.lasso
    }

    /// Trial whose data is awaited
    pub fn pending_trial(&self) -> Option<&Trial> {
        self.pending_trial.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.active.as_ref().map(|a| &a.scene)
    }

    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    pub fn ranking(&self) -> Option<&RankingPhase> {
        self.ranking.as_ref()
    }

    pub fn participant_code(&self) -> ParticipantCode {
        self.participant_code
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Whether leaving the page would discard results
    pub fn needs_unload_guard(&self) -> bool {
        self.phase != Phase::Done
    }

    /// Sanity checks plus trials; the ranking pages are not counted
    pub fn planned_steps(&self) -> usize {
        self.program.total_trials() + TaskKind::BLOCKS.len()
    }

    pub fn progress_display(&self) -> ProgressDisplay {
        let ranking = matches!(
            self.phase,
            Phase::FinalRanking { .. } | Phase::Submitting | Phase::SubmissionFailed | Phase::Done
        );
        self.progress.display(self.planned_steps(), ranking)
    }

    /// Apply one event at monotonic time `now`
    pub fn handle(&mut self, event: StudyEvent, now: Duration) -> SequencerResult<Vec<Effect>> {
        trace!("{} in phase {}", event.name(), self.phase);
        self.last_event_at = now;
        match event {
            StudyEvent::Pause => Ok(self.pause_study(now)),
            StudyEvent::Resume => Ok(self.resume_study(now)),
            StudyEvent::ResumeKey(key) if is_resume_key(&key) => Ok(self.resume_study(now)),
            StudyEvent::ResumeKey(_) => Ok(Vec::new()),
            StudyEvent::Pointer(_) | StudyEvent::Advance | StudyEvent::Reset | StudyEvent::Rank { .. }
                if self.pause.is_paused() =>
            {
                debug!("{} ignored while paused", event.name());
                Ok(Vec::new())
            }
            StudyEvent::CatalogLoaded(catalog) => self.on_catalog(catalog),
            StudyEvent::Advance => self.on_advance(now),
            StudyEvent::TrialDataLoaded { trial, data } => self.on_trial_data(trial, data, now),
            StudyEvent::Pointer(pointer) => Ok(self.on_pointer(pointer)),
            StudyEvent::Reset => self.on_reset(),
            StudyEvent::ThumbnailLoaded { dataset, projection, data } => {
                self.on_thumbnail(dataset, projection, data)
            }
            StudyEvent::Rank { projection, rank } => self.on_rank(&projection, rank),
            StudyEvent::SubmissionSucceeded => self.on_submission_succeeded(),
            StudyEvent::SubmissionFailed { reason } => self.on_submission_failed(reason),
            StudyEvent::AttachSurvey(survey) => self.on_attach(|s| s.survey = Some(survey), "AttachSurvey"),
            StudyEvent::AttachProlific(prolific) => {
                self.on_attach(|s| s.prolific = Some(prolific), "AttachProlific")
            }
        }
    }

    fn unexpected(&self, event: &'static str) -> SequencerError {
        SequencerError::UnexpectedEvent { event, phase: self.phase }
    }

    fn pause_study(&mut self, now: Duration) -> Vec<Effect> {
        if !self.pause.pause(now) {
            return Vec::new();
        }
        self.lasso.set_suspended(true);
        info!("study paused in phase {}", self.phase);
        vec![Effect::PauseOverlay { visible: true }]
    }

    fn resume_study(&mut self, now: Duration) -> Vec<Effect> {
        if !self.pause.resume(now) {
            return Vec::new();
        }
        self.lasso.set_suspended(false);
        info!("study resumed, {:?} paused in total", self.pause.paused_total(now));
        vec![Effect::PauseOverlay { visible: false }]
    }

    fn on_catalog(&mut self, catalog: Catalog) -> SequencerResult<Vec<Effect>> {
        if self.phase != Phase::Loading {
            return Err(self.unexpected("CatalogLoaded"));
        }
        self.program = TrialProgram::build(&catalog, &self.config, &mut self.rng);
        self.phase = Phase::Welcome;
        Ok(vec![Effect::ShowWelcome, Effect::Progress(self.progress_display())])
    }

    fn on_advance(&mut self, now: Duration) -> SequencerResult<Vec<Effect>> {
        match self.phase {
            Phase::Welcome => self.enter_block(0),
            Phase::BlockIntro { block } => self.enter_sanity_check(block),
            Phase::SanityCheck { block } => self.finish_sanity_check(block),
            Phase::Trial { block, index, stage: TrialStage::Active } => self.finish_trial(block, index, now),
            Phase::FinalRanking { .. } => self.finish_ranking_page(),
            Phase::SubmissionFailed => Ok(self.retry_submission()),
            _ => Err(self.unexpected("Advance")),
        }
    }

    /// Intro page of block `block`, or the ranking phase after the last block
    fn enter_block(&mut self, block: usize) -> SequencerResult<Vec<Effect>> {
        self.progress.block_cursor = block;
        self.progress.trial_cursor = 0;
        self.active = None;

        let Some(&task) = TaskKind::BLOCKS.get(block) else {
            return self.enter_ranking();
        };
        let spec = task.spec();
        info!("block {} ({}) started", block, task);
        self.phase = Phase::BlockIntro { block };
        Ok(vec![Effect::ShowBlockIntro {
            task,
            title: spec.title,
            instructions: spec.instructions,
        }])
    }

    fn enter_sanity_check(&mut self, block: usize) -> SequencerResult<Vec<Effect>> {
        let task = TaskKind::BLOCKS[block];
        let Some(layout) = task.spec().sanity else {
            warn!("task {} has no sanity layout, skipping to its trials", task);
            return self.start_trial(block, 0);
        };
        let scene = layout.generate(
            task,
            &self.config.viewport,
            self.config.sanity_cluster_size,
            &mut self.rng,
        );
        self.activate(task, scene.clone());
        self.phase = Phase::SanityCheck { block };
        Ok(vec![Effect::RenderScene(scene), Effect::Progress(self.progress_display())])
    }

    fn finish_sanity_check(&mut self, block: usize) -> SequencerResult<Vec<Effect>> {
        let task = TaskKind::BLOCKS[block];
        if !task.sanity_passed(self.lasso.selection(), self.config.sanity_cluster_size) {
            info!("sanity check {} failed, selection cleared", task);
            self.lasso.reset();
            return Ok(vec![
                Effect::Notice(Notice::SanityFailed { task }),
                Effect::Recolor(self.lasso.selection().styles()),
            ]);
        }

        self.log.push_sanity(task, self.lasso.selection().snapshot());
        self.progress.global_trial_counter += 1;
        info!("sanity check {} passed", task);
        self.start_trial(block, 0)
    }

    /// Request trial `index` of `block`, or move on once the block is exhausted
    fn start_trial(&mut self, block: usize, index: usize) -> SequencerResult<Vec<Effect>> {
        let task = TaskKind::BLOCKS[block];
        self.progress.trial_cursor = index;
        self.stopwatch = None;

        let Some(trial) = self.program.trial(task, index).cloned() else {
            debug!("block {} exhausted after {} trials", task, index);
            return self.enter_block(block + 1);
        };
        debug!("fetching {}/{} for {}", trial.dataset, trial.projection, task);
        self.pending_trial = Some(trial.clone());
        self.phase = Phase::Trial {
            block,
            index,
            stage: TrialStage::Fetching,
        };
        Ok(vec![Effect::FetchTrial(trial), Effect::Progress(self.progress_display())])
    }

    fn on_trial_data(&mut self, trial: Trial, data: TrialData, now: Duration) -> SequencerResult<Vec<Effect>> {
        let Phase::Trial { block, index, stage: TrialStage::Fetching } = self.phase else {
            return Err(self.unexpected("TrialDataLoaded"));
        };
        let Some(expected) = self.pending_trial.as_ref() else {
            return Err(self.unexpected("TrialDataLoaded"));
        };
        if *expected != trial {
            return Err(SequencerError::StaleTrialData {
                expected_dataset: expected.dataset.clone(),
                expected_projection: expected.projection.clone(),
                received_dataset: trial.dataset,
                received_projection: trial.projection,
            });
        }
        data.validate(&trial)?;

        let task = trial.task;
        let highlight = match task.spec().highlight {
            HighlightRule::ReferencePoint => data.resolve_highlight(&mut self.rng),
            _ => None,
        };
        let scene = data.to_scene(task, &self.config.viewport, highlight);
        self.activate(task, scene.clone());
        self.stopwatch = Some(self.pause.stopwatch(now));
        self.pending_trial = None;
        self.phase = Phase::Trial {
            block,
            index,
            stage: TrialStage::Active,
        };
        debug!("rendered {} points for {}/{}", scene.len(), trial.dataset, trial.projection);
        Ok(vec![Effect::RenderScene(scene)])
    }

    fn finish_trial(&mut self, block: usize, index: usize, now: Duration) -> SequencerResult<Vec<Effect>> {
        let selection = self.lasso.selection();
        if !selection.has_selection() && self.config.empty_selection_policy == EmptySelectionPolicy::Block {
            return Ok(vec![Effect::Notice(Notice::EmptySelection)]);
        }
        let groups = selection.snapshot();

        let task = TaskKind::BLOCKS[block];
        let Some(trial) = self.program.trial(task, index).cloned() else {
            return self.enter_block(block + 1);
        };
        let elapsed = self
            .stopwatch
            .map(|watch| watch.elapsed(&self.pause, now))
            .unwrap_or_default();
        let time_ms = elapsed.as_millis() as u64;

        self.log.push_trial(
            task,
            trial.dataset.as_str(),
            trial.projection.as_str(),
            groups,
            time_ms,
        );
        self.progress.global_trial_counter += 1;
        info!(
            "trial {}/{} of {} done in {} ms",
            trial.dataset, trial.projection, task, time_ms
        );
        self.start_trial(block, index + 1)
    }

    fn activate(&mut self, task: TaskKind, scene: Scene) {
        self.lasso = LassoSelector::new(task.selection_mode());
        self.lasso.set_suspended(self.pause.is_paused());
        self.active = Some(ActiveScene::new(scene));
    }

    fn on_pointer(&mut self, pointer: PointerEvent) -> Vec<Effect> {
        let interactive = matches!(
            self.phase,
            Phase::SanityCheck { .. } | Phase::Trial { stage: TrialStage::Active, .. }
        );
        let Some(active) = self.active.as_ref().filter(|_| interactive) else {
            trace!("pointer input outside an interactive scene ignored");
            return Vec::new();
        };
        let drawn = match pointer {
            PointerEvent::Down(at) => self.lasso.begin(at),
            PointerEvent::Move(to) => self.lasso.extend(to),
            PointerEvent::Up => {
                return match self.lasso.commit(&active.points) {
                    CommitOutcome::Ignored => Vec::new(),
                    CommitOutcome::Discarded => vec![Effect::LassoOutline(None)],
                    CommitOutcome::Committed { styles, .. } => {
                        vec![Effect::LassoOutline(None), Effect::Recolor(styles)]
                    }
                };
            }
        };
        if !drawn {
            return Vec::new();
        }
        let path = self.lasso.polygon().and_then(Polygon::to_path_data);
        vec![Effect::LassoOutline(path)]
    }

    fn on_reset(&mut self) -> SequencerResult<Vec<Effect>> {
        let interactive = matches!(
            self.phase,
            Phase::SanityCheck { .. } | Phase::Trial { stage: TrialStage::Active, .. }
        );
        match self.active.as_ref().filter(|_| interactive) {
            Some(active) => {
                let scene = active.scene.clone();
                self.lasso.reset();
                debug!("scene reset in phase {}", self.phase);
                Ok(vec![Effect::RenderScene(scene)])
            }
            None => Err(self.unexpected("Reset")),
        }
    }

    fn enter_ranking(&mut self) -> SequencerResult<Vec<Effect>> {
        let ranking = RankingPhase::new(&self.program, self.config.max_rank, &mut self.rng);
        info!("ranking phase started with {} pages", ranking.page_count());
        let page = ranking.current_page();
        self.ranking = Some(ranking);
        self.phase = Phase::FinalRanking { page: 0 };

        match page {
            Some(page) => {
                let mut effects = Self::ranking_page_effects(page);
                effects.push(Effect::Progress(self.progress_display()));
                Ok(effects)
            }
            None => {
                warn!("no dataset to rank, submitting directly");
                self.submit_results()
            }
        }
    }

    /// Show a page, then request one thumbnail per projection on it
    fn ranking_page_effects(page: RankingPage) -> Vec<Effect> {
        let fetches: Vec<Effect> = page
            .projections
            .iter()
            .map(|projection| Effect::FetchThumbnail {
                dataset: page.dataset.clone(),
                projection: projection.clone(),
            })
            .collect();
        let mut effects = vec![Effect::ShowRankingPage(page)];
        effects.extend(fetches);
        effects
    }

    /// Thumbnails for a page already left behind are dropped
    fn on_thumbnail(&mut self, dataset: String, projection: String, data: TrialData) -> SequencerResult<Vec<Effect>> {
        let Phase::FinalRanking { .. } = self.phase else {
            debug!("thumbnail {}/{} arrived after the ranking phase", dataset, projection);
            return Ok(Vec::new());
        };
        let on_page = self
            .ranking
            .as_ref()
            .and_then(RankingPhase::current_page)
            .is_some_and(|page| page.dataset == dataset && page.projections.contains(&projection));
        if !on_page {
            debug!("thumbnail {}/{} is not on the open page", dataset, projection);
            return Ok(Vec::new());
        }
        data.validate_for(&dataset, &projection)?;

        let scene = data.to_thumbnail(&self.config.thumbnail);
        Ok(vec![Effect::ShowThumbnail { dataset, projection, scene }])
    }

    fn on_rank(&mut self, projection: &str, rank: Option<u8>) -> SequencerResult<Vec<Effect>> {
        let Phase::FinalRanking { .. } = self.phase else {
            return Err(self.unexpected("Rank"));
        };
        let Some(ranking) = self.ranking.as_mut() else {
            return Err(self.unexpected("Rank"));
        };
        match ranking.set_rank(projection, rank) {
            Ok(()) => Ok(Vec::new()),
            Err(e) => {
                debug!("rank rejected: {}", e);
                Ok(vec![Effect::Notice(Notice::RankRejected { message: e.to_string() })])
            }
        }
    }

    fn finish_ranking_page(&mut self) -> SequencerResult<Vec<Effect>> {
        let Some(ranking) = self.ranking.as_mut() else {
            return Err(self.unexpected("Advance"));
        };
        if ranking.next_page() {
            self.progress.global_trial_counter += 1;
            let index = ranking.page_index();
            let page = ranking.current_page();
            self.phase = Phase::FinalRanking { page: index };
            let mut effects = page.map(Self::ranking_page_effects).unwrap_or_default();
            effects.push(Effect::Progress(self.progress_display()));
            return Ok(effects);
        }
        let effects = self.submit_results()?;
        self.progress.global_trial_counter += 1;
        Ok(effects)
    }

    /// Append the ranking record and emit the one and only `Submit`
    fn submit_results(&mut self) -> SequencerResult<Vec<Effect>> {
        let matrix = self.ranking.as_ref().map(|r| r.matrix().clone()).unwrap_or_default();
        let mut log = self.log.clone();
        log.push_ranking(matrix);
        log.validate(self.config.max_rank)?;
        self.log = log;

        let submission = Submission::new(&self.log, self.participant_code, self.timestamp_at_now())
            .with_survey(self.survey.clone())
            .with_prolific(self.prolific.clone());
        info!("submitting {} records", submission.results.len());
        self.submission = Some(submission.clone());
        self.phase = Phase::Submitting;
        Ok(vec![
            Effect::Progress(self.progress_display()),
            Effect::Submit(submission),
        ])
    }

    fn timestamp_at_now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.last_event_at)
            .ok()
            .and_then(|offset| self.wall_origin.checked_add_signed(offset))
            .unwrap_or(self.wall_origin)
    }

    fn retry_submission(&mut self) -> Vec<Effect> {
        match self.submission.clone() {
            Some(submission) => {
                info!("retrying submission");
                self.phase = Phase::Submitting;
                vec![Effect::Submit(submission)]
            }
            None => Vec::new(),
        }
    }

    fn on_submission_succeeded(&mut self) -> SequencerResult<Vec<Effect>> {
        if self.phase != Phase::Submitting {
            return Err(self.unexpected("SubmissionSucceeded"));
        }
        self.phase = Phase::Done;
        info!("study completed, participant code {}", self.participant_code);
        Ok(vec![Effect::Completed {
            participant_code: self.participant_code,
            prolific: self.submission.as_ref().and_then(|s| s.prolific.clone()),
        }])
    }

    fn on_submission_failed(&mut self, reason: String) -> SequencerResult<Vec<Effect>> {
        if self.phase != Phase::Submitting {
            return Err(self.unexpected("SubmissionFailed"));
        }
        warn!("submission failed: {}", reason);
        self.phase = Phase::SubmissionFailed;
        Ok(vec![Effect::Notice(Notice::SubmissionFailed { reason })])
    }

    /// Survey and platform context can be attached until the submission is
    /// in flight; a failed submission picks them up on retry
    fn on_attach(&mut self, attach: impl FnOnce(&mut Self), event: &'static str) -> SequencerResult<Vec<Effect>> {
        if matches!(self.phase, Phase::Submitting | Phase::Done) {
            return Err(self.unexpected(event));
        }
        attach(self);
        if let Some(submission) = self.submission.take() {
            self.submission = Some(
                submission
                    .with_survey(self.survey.clone())
                    .with_prolific(self.prolific.clone()),
            );
        }
        Ok(Vec::new())
    }
}

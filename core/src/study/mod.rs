//! Study program: task kinds, sanity checks, trials, ranking and the
//! sequencer that walks a participant through them
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod catalog;
pub mod clock;
pub mod progress;
pub mod ranking;
pub mod sanity;
pub mod sequencer;
pub mod task;

pub use self::catalog::{Catalog, NearestPair, Trial, TrialData, TrialDataError, TrialProgram};
pub use self::clock::{is_resume_key, Clock, ManualClock, PauseClock, Stopwatch, SystemClock};
pub use self::progress::{ProgressDisplay, StudyProgress};
pub use self::ranking::{RankingError, RankingMatrix, RankingPage, RankingPhase};
pub use self::sanity::SanityLayout;
pub use self::sequencer::{
    Effect, Notice, Phase, SequencerError, SequencerResult, SequencerState, StudyEvent, TrialStage,
};
pub use self::task::{HighlightRule, TaskKind, TaskSpec, UnknownTaskKind};

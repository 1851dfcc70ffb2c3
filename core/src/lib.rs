//! Core model of the projection lasso study
//!
//! Participants look at 2D projections of labelled datasets and answer
//! perceptual questions by lassoing points: identify clusters (E1), select
//! the cluster of a highlighted point (E2), select the cluster nearest a
//! highlighted one (E3), select the densest cluster (E4), and finally rank
//! every projection of each dataset (E5). Each lasso block opens with a
//! synthetic sanity check whose answer is known.
//!
//! This crate holds everything except I/O: geometry and hit-testing, the
//! lasso selector and its group-membership protocol, the trial program, the
//! pure [`SequencerState`] transition function, result records and the
//! submission payload, plus an async [`StudyRunner`] that drives the
//! sequencer against abstract [`StudyBackend`] and [`Presenter`]
//! collaborators.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod collaborator;
pub mod config;
pub mod error;
pub mod geometry;
pub mod record;
pub mod runner;
pub mod scene;
pub mod selection;
pub mod study;

pub use self::collaborator::{Presenter, StudyBackend};
pub use self::config::{ConfigError, EmptySelectionPolicy, StudyConfig, Viewport};
pub use self::error::{StudyError, StudyResult};
pub use self::geometry::{polygon_contains, Polygon, Position};
pub use self::record::{ParticipantCode, ProlificContext, ResultLog, ResultRecord, Submission, Survey};
pub use self::runner::StudyRunner;
pub use self::scene::{Fill, Point, Scene};
pub use self::selection::{LassoSelector, PointerEvent, SelectionMode, SelectionState};
pub use self::study::{
    Catalog, Effect, Notice, Phase, SequencerState, StudyEvent, TaskKind, Trial, TrialData,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

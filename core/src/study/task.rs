//! Task kinds and their dispatch table
//!
//! Each block of the study presents one task kind. Everything that varies by
//! kind (instructions, lasso mode, the synthetic sanity layout and its answer
//! key, and how trial points are coloured) hangs off a single static
//! [`TaskSpec`] per kind instead of being branched on at each use site.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::{SelectionMode, SelectionState};
use crate::study::sanity::{self, SanityLayout};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown task kind: {0}")]
pub struct UnknownTaskKind(pub String);

/// The five study tasks. E1–E4 are lasso blocks, E5 is the final ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskKind {
    /// Cluster identification
    E1,

    /// Membership identification
    E2,

    /// Nearest-cluster comparison
    E3,

    /// Density comparison
    E4,

    /// Projection ranking
    E5,
}

/// How trial points are coloured before any selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightRule {
    /// Every point grey
    None,

    /// One reference point in red
    ReferencePoint,

    /// The reference cluster in red, or per-label colours when the trial
    /// data names no reference cluster
    ReferenceCluster,
}

/// Static per-kind behaviour
pub struct TaskSpec {
    pub kind: TaskKind,

    /// Block heading shown on the intro page
    pub title: &'static str,

    /// Instruction text shown on the intro page and above every trial
    pub instructions: &'static str,

    /// Lasso mode for sanity check and trials
    pub mode: SelectionMode,

    /// Trial colouring rule
    pub highlight: HighlightRule,

    /// Synthetic sanity layout; `None` for the ranking phase
    pub sanity: Option<SanityLayout>,

    /// Answer key for the sanity check, given the cluster size
    pub predicate: Option<fn(&SelectionState, usize) -> bool>,
}

static E1_SPEC: TaskSpec = TaskSpec {
    kind: TaskKind::E1,
    title: "Task 1: Cluster Identification",
    instructions: "Select all clusters using the lasso tool. Each lasso selection shall represent one cluster.",
    mode: SelectionMode::Multi,
    highlight: HighlightRule::None,
    sanity: Some(sanity::TWO_SEPARATED),
    predicate: Some(sanity::two_clusters_identified),
};

static E2_SPEC: TaskSpec = TaskSpec {
    kind: TaskKind::E2,
    title: "Task 2: Membership Identification",
    instructions: "You will see a red-highlighted point. Please select the cluster this point belongs to.",
    mode: SelectionMode::Single,
    highlight: HighlightRule::ReferencePoint,
    sanity: Some(sanity::THREE_WITH_REFERENCE_POINT),
    predicate: Some(sanity::member_cluster_selected),
};

static E3_SPEC: TaskSpec = TaskSpec {
    kind: TaskKind::E3,
    title: "Task 3: Distance Comparison",
    instructions: "One cluster will be highlighted. Select the cluster that is nearest to it.",
    mode: SelectionMode::Single,
    highlight: HighlightRule::ReferenceCluster,
    sanity: Some(sanity::THREE_WITH_REFERENCE_CLUSTER),
    predicate: Some(sanity::nearest_cluster_selected),
};

static E4_SPEC: TaskSpec = TaskSpec {
    kind: TaskKind::E4,
    title: "Task 4: Density Comparison",
    instructions: "Select the cluster that is most compact or dense (most tightly packed points).",
    mode: SelectionMode::Single,
    highlight: HighlightRule::None,
    sanity: Some(sanity::THREE_VARYING_DENSITY),
    predicate: Some(sanity::densest_cluster_selected),
};

static E5_SPEC: TaskSpec = TaskSpec {
    kind: TaskKind::E5,
    title: "Task 5: Projection Ranking",
    instructions: "Rank all projections of each dataset from best to worst. Same ranks allowed.",
    mode: SelectionMode::Single,
    highlight: HighlightRule::None,
    sanity: None,
    predicate: None,
};

impl TaskKind {
    /// Lasso blocks in presentation order
    pub const BLOCKS: [TaskKind; 4] = [TaskKind::E1, TaskKind::E2, TaskKind::E3, TaskKind::E4];

    pub fn spec(self) -> &'static TaskSpec {
        match self {
            TaskKind::E1 => &E1_SPEC,
            TaskKind::E2 => &E2_SPEC,
            TaskKind::E3 => &E3_SPEC,
            TaskKind::E4 => &E4_SPEC,
            TaskKind::E5 => &E5_SPEC,
        }
    }

    pub fn selection_mode(self) -> SelectionMode {
        self.spec().mode
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::E1 => "E1",
            TaskKind::E2 => "E2",
            TaskKind::E3 => "E3",
            TaskKind::E4 => "E4",
            TaskKind::E5 => "E5",
        }
    }

    /// Whether this kind forms a lasso block
    pub fn is_block(self) -> bool {
        !matches!(self, TaskKind::E5)
    }

    /// Evaluate the sanity answer key against a selection
    pub fn sanity_passed(self, selection: &SelectionState, cluster_size: usize) -> bool {
        match self.spec().predicate {
            Some(predicate) => predicate(selection, cluster_size),
            None => false,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E1" => Ok(TaskKind::E1),
            "E2" => Ok(TaskKind::E2),
            "E3" => Ok(TaskKind::E3),
            "E4" => Ok(TaskKind::E4),
            "E5" => Ok(TaskKind::E5),
            other => Err(UnknownTaskKind(other.to_string())),
        }
    }
}

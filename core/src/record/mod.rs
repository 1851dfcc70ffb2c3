//! Result records and the append-only result log
//!
//! Every completed sanity check, trial and the final ranking appends one
//! record. Records serialise to the shapes the submission endpoint stores:
//!
//! ```text
//! {"experiment": "E2_sanity", "selected": [[50, 51, ...]]}
//! {"experiment": "E2", "dataset": "iris", "projection": "tsne",
//!  "selected": [[...]], "time_ms": 5123}
//! {"experiment": "E5", "preference": {"iris": {"tsne": 1, "umap": 3}}}
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod submission;

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::study::ranking::RankingMatrix;
use crate::study::task::TaskKind;

pub use self::submission::{ParticipantCode, ProlificContext, Submission, Survey};

/// Result log consistency violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// An index appears in two groups of one record
    #[error("Record {record} selects index {index} in more than one group")]
    OverlappingGroups { record: usize, index: usize },

    /// A ranking record that is not the final record
    #[error("Ranking record at position {0} is not the last record")]
    MisplacedRanking(usize),

    /// Rank outside the configured scale
    #[error("Rank {rank} for {dataset}/{projection} outside 1..={max_rank}")]
    RankOutOfRange {
        dataset: String,
        projection: String,
        rank: u8,
        max_rank: u8,
    },

    /// Record tagged with a task kind that cannot produce it
    #[error("Record {record} carries task kind {kind} which cannot produce it")]
    WrongTaskKind { record: usize, kind: TaskKind },
}

/// `"<kind>_sanity"` experiment tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanityTag(pub TaskKind);

impl fmt::Display for SanityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_sanity", self.0)
    }
}

impl Serialize for SanityTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SanityTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let kind = raw
            .strip_suffix("_sanity")
            .ok_or_else(|| de::Error::custom(format!("not a sanity tag: {raw}")))?;
        kind.parse().map(SanityTag).map_err(de::Error::custom)
    }
}

/// Passed sanity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityRecord {
    pub experiment: SanityTag,
    pub selected: Vec<Vec<usize>>,
}

/// Completed trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub experiment: TaskKind,
    pub dataset: String,
    pub projection: String,
    pub selected: Vec<Vec<usize>>,

    /// Active time from render to advance, paused time excluded
    pub time_ms: u64,
}

/// Final projection ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub experiment: TaskKind,
    pub preference: RankingMatrix,
}

/// One entry of the result log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRecord {
    Trial(TrialRecord),
    Ranking(RankingRecord),
    Sanity(SanityRecord),
}

impl ResultRecord {
    pub fn kind(&self) -> TaskKind {
        match self {
            ResultRecord::Trial(r) => r.experiment,
            ResultRecord::Ranking(r) => r.experiment,
            ResultRecord::Sanity(r) => r.experiment.0,
        }
    }

    /// Selected groups, for lasso records
    pub fn selected(&self) -> Option<&[Vec<usize>]> {
        match self {
            ResultRecord::Trial(r) => Some(&r.selected),
            ResultRecord::Sanity(r) => Some(&r.selected),
            ResultRecord::Ranking(_) => None,
        }
    }
}

/// Append-only log of study results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultLog {
    records: Vec<ResultRecord>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push_sanity(&mut self, kind: TaskKind, selected: Vec<Vec<usize>>) {
        self.records.push(ResultRecord::Sanity(SanityRecord {
            experiment: SanityTag(kind),
            selected,
        }));
    }

    pub fn push_trial(
        &mut self,
        kind: TaskKind,
        dataset: impl Into<String>,
        projection: impl Into<String>,
        selected: Vec<Vec<usize>>,
        time_ms: u64,
    ) {
        self.records.push(ResultRecord::Trial(TrialRecord {
            experiment: kind,
            dataset: dataset.into(),
            projection: projection.into(),
            selected,
            time_ms,
        }));
    }

    pub fn push_ranking(&mut self, preference: RankingMatrix) {
        self.records.push(ResultRecord::Ranking(RankingRecord {
            experiment: TaskKind::E5,
            preference,
        }));
    }

    /// Whether the final ranking has been appended
    pub fn has_ranking(&self) -> bool {
        self.records.iter().any(|r| matches!(r, ResultRecord::Ranking(_)))
    }

    /// Check structural invariants of the whole log
    pub fn validate(&self, max_rank: u8) -> Result<(), RecordError> {
        let last = self.records.len().saturating_sub(1);
        for (i, record) in self.records.iter().enumerate() {
            match record {
                ResultRecord::Ranking(ranking) => {
                    if i != last {
                        return Err(RecordError::MisplacedRanking(i));
                    }
                    if ranking.experiment != TaskKind::E5 {
                        return Err(RecordError::WrongTaskKind { record: i, kind: ranking.experiment });
                    }
                    for (dataset, ranks) in &ranking.preference {
                        for (projection, &rank) in ranks {
                            if rank == 0 || rank > max_rank {
                                return Err(RecordError::RankOutOfRange {
                                    dataset: dataset.clone(),
                                    projection: projection.clone(),
                                    rank,
                                    max_rank,
                                });
                            }
                        }
                    }
                }
                lasso => {
                    if !lasso.kind().is_block() {
                        return Err(RecordError::WrongTaskKind { record: i, kind: lasso.kind() });
                    }
                    let mut seen = HashSet::new();
                    for &index in lasso.selected().into_iter().flatten().flatten() {
                        if !seen.insert(index) {
                            return Err(RecordError::OverlappingGroups { record: i, index });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
    }
}

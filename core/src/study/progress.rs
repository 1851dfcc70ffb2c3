//! Study progress cursors
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cursors mutated only by sequencer advances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyProgress {
    /// Index of the current lasso block (4 once every block is exhausted)
    pub block_cursor: usize,

    /// Index of the current trial within its block
    pub trial_cursor: usize,

    /// Sanity checks passed + trials completed + ranking pages completed
    pub global_trial_counter: usize,
}

/// Counter shown to participants, e.g. `"7 of 40"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressDisplay {
    pub current: usize,
    pub total: usize,
}

impl StudyProgress {
    /// Display value given the number of planned steps (trials plus one
    /// sanity check per block). The ranking phase always shows the total.
    pub fn display(&self, planned: usize, ranking: bool) -> ProgressDisplay {
        let current = if ranking {
            planned
        } else {
            (self.global_trial_counter + 1).min(planned)
        };
        ProgressDisplay { current, total: planned }
    }
}

impl fmt::Display for ProgressDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.current, self.total)
    }
}

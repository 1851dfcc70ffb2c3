//! Lasso selection protocol
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod lasso;
pub mod palette;
pub mod state;

use serde::{Deserialize, Serialize};

pub use self::lasso::{CommitOutcome, LassoSelector, PointerEvent};
pub use self::state::{GroupStyle, SelectionState};

/// How a committed lasso combines with the existing selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionMode {
    /// The selection is always a single group; each lasso replaces it
    Single,

    /// Each lasso appends a new group
    Multi,
}

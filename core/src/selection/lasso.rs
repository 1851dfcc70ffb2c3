//! Lasso selector interaction machine
//!
//! Pointer input drives a two-phase machine, `Idle -> Capturing -> Idle`.
//! `begin` opens a capture at the pointer position, `extend` appends raw
//! samples, and `commit` closes the polygon, hit-tests every point's screen
//! position against it and folds the resulting candidate set into the
//! selection. The selector knows nothing about trials; it only reports index
//! groups.
//!
//! While suspended (study paused) every handler is a no-op and an in-progress
//! capture is left untouched, so a drag can continue after resuming.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::state::{GroupStyle, SelectionState};
use super::SelectionMode;
use crate::geometry::{Polygon, Position};
use crate::scene::Point;

/// Abstract pointer input, independent of any UI binding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Position),
    Move(Position),
    Up,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Capture {
    #[default]
    Idle,
    Capturing(Polygon),
}

/// Result of closing a lasso
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No capture was active, or the selector is suspended
    Ignored,

    /// The polygon enclosed no point; the selection is unchanged
    Discarded,

    /// The candidate was folded into the selection
    Committed {
        /// Number of indices claimed by the new group
        claimed: usize,

        /// Recolour instructions for every group after the commit
        styles: Vec<GroupStyle>,
    },
}

/// Freehand lasso bound to one rendered point set
#[derive(Debug, Clone, PartialEq)]
pub struct LassoSelector {
    mode: SelectionMode,
    capture: Capture,
    selection: SelectionState,
    suspended: bool,
}

impl LassoSelector {
    /// Activate a selector in a fixed mode with an empty selection
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            capture: Capture::Idle,
            selection: SelectionState::new(),
            suspended: false,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.capture, Capture::Capturing(_))
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Polygon of the capture in progress, for drawing the lasso outline
    pub fn polygon(&self) -> Option<&Polygon> {
        match &self.capture {
            Capture::Capturing(polygon) => Some(polygon),
            Capture::Idle => None,
        }
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    /// Start a new boundary, discarding any capture in progress
    pub fn begin(&mut self, at: Position) -> bool {
        if self.suspended {
            return false;
        }
        self.capture = Capture::Capturing(Polygon::starting_at(at));
        true
    }

    /// Append a pointer sample to the active capture
    pub fn extend(&mut self, to: Position) -> bool {
        if self.suspended {
            return false;
        }
        match &mut self.capture {
            Capture::Capturing(polygon) => {
                polygon.push(to);
                true
            }
            Capture::Idle => false,
        }
    }

    /// Close the capture and fold the enclosed points into the selection
    pub fn commit(&mut self, points: &[Point]) -> CommitOutcome {
        if self.suspended {
            return CommitOutcome::Ignored;
        }
        let polygon = match std::mem::take(&mut self.capture) {
            Capture::Capturing(polygon) => polygon,
            Capture::Idle => return CommitOutcome::Ignored,
        };

        let candidate: Vec<usize> = points
            .iter()
            .filter(|p| polygon.contains(p.screen))
            .map(|p| p.original_index)
            .collect();
        trace!(
            "lasso closed with {} vertices enclosing {} points",
            polygon.len(),
            candidate.len()
        );

        let claimed = candidate.len();
        if !self.selection.apply(candidate, self.mode) {
            return CommitOutcome::Discarded;
        }

        debug!(
            "lasso committed {} points, {} groups selected",
            claimed,
            self.selection.len()
        );
        CommitOutcome::Committed {
            claimed,
            styles: self.selection.styles(),
        }
    }

    /// Drop the selection and any capture, as when the scene is redrawn
    pub fn reset(&mut self) {
        self.capture = Capture::Idle;
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> Vec<Point> {
        // 10 x 10 grid, 10 px apart, index = row * 10 + col
        (0..100)
            .map(|i| {
                let screen = Position::new((i % 10) as f64 * 10.0 + 5.0, (i / 10) as f64 * 10.0 + 5.0);
                Point {
                    data: screen,
                    screen,
                    cluster_label: (i / 50) as i64,
                    original_index: i,
                }
            })
            .collect()
    }

    fn drag(selector: &mut LassoSelector, points: &[Point], corners: [(f64, f64); 4]) -> CommitOutcome {
        selector.begin(corners[0].into());
        for c in &corners[1..] {
            selector.extend((*c).into());
        }
        selector.commit(points)
    }

    #[test]
    fn test_commit_selects_enclosed_points() {
        let points = grid_points();
        let mut selector = LassoSelector::new(SelectionMode::Multi);
        // Top-left 2x2 block of points.
        let outcome = drag(&mut selector, &points, [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]);

        assert!(matches!(outcome, CommitOutcome::Committed { claimed: 4, .. }));
        assert_eq!(selector.selection().groups(), &[vec![0, 1, 10, 11]]);
        assert!(!selector.is_capturing());
    }

    #[test]
    fn test_extend_without_begin_is_noop() {
        let points = grid_points();
        let mut selector = LassoSelector::new(SelectionMode::Multi);
        assert!(!selector.extend(Position::new(3.0, 3.0)));
        assert_eq!(selector.commit(&points), CommitOutcome::Ignored);
    }

    #[test]
    fn test_empty_lasso_is_discarded() {
        let points = grid_points();
        let mut selector = LassoSelector::new(SelectionMode::Multi);
        drag(&mut selector, &points, [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]);

        let outcome = drag(&mut selector, &points, [(200.0, 200.0), (210.0, 200.0), (210.0, 210.0), (200.0, 210.0)]);
        assert_eq!(outcome, CommitOutcome::Discarded);
        assert_eq!(selector.selection().len(), 1);
    }

    #[test]
    fn test_begin_discards_capture_in_progress() {
        let points = grid_points();
        let mut selector = LassoSelector::new(SelectionMode::Single);
        selector.begin(Position::new(0.0, 0.0));
        selector.extend(Position::new(100.0, 0.0));
        selector.begin(Position::new(90.0, 90.0));
        assert_eq!(selector.polygon().map(|p| p.len()), Some(1));
        selector.extend(Position::new(100.0, 90.0));
        selector.extend(Position::new(100.0, 100.0));
        selector.extend(Position::new(90.0, 100.0));
        selector.commit(&points);
        assert_eq!(selector.selection().groups(), &[vec![99]]);
    }

    #[test]
    fn test_suspended_selector_ignores_pointer() {
        let points = grid_points();
        let mut selector = LassoSelector::new(SelectionMode::Multi);
        selector.begin(Position::new(0.0, 0.0));
        selector.set_suspended(true);

        assert!(!selector.extend(Position::new(20.0, 0.0)));
        assert_eq!(selector.commit(&points), CommitOutcome::Ignored);
        assert!(selector.is_capturing());

        selector.set_suspended(false);
        selector.extend(Position::new(20.0, 0.0));
        selector.extend(Position::new(20.0, 20.0));
        selector.extend(Position::new(0.0, 20.0));
        assert!(matches!(selector.commit(&points), CommitOutcome::Committed { claimed: 4, .. }));
    }

    #[test]
    fn test_reset_clears_selection() {
        let points = grid_points();
        let mut selector = LassoSelector::new(SelectionMode::Multi);
        drag(&mut selector, &points, [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]);
        selector.begin(Position::new(1.0, 1.0));
        selector.reset();
        assert!(selector.selection().is_empty());
        assert!(!selector.is_capturing());
    }
}

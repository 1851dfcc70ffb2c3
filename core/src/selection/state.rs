//! Disjoint selection groups
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::palette;
use super::SelectionMode;

/// Ordered sequence of disjoint groups of original point indices.
///
/// Invariant: no index is a member of two groups. Every `apply` first strips
/// the claimed indices from the existing groups. Groups emptied that way keep
/// their position so that group `i` keeps its colour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    groups: Vec<Vec<usize>>,
}

/// Recolour instruction for one selection group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStyle {
    pub group: usize,
    pub color: String,
    pub indices: Vec<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True when at least one group holds at least one index
    pub fn has_selection(&self) -> bool {
        self.groups.iter().any(|g| !g.is_empty())
    }

    /// Union of every group
    pub fn union(&self) -> BTreeSet<usize> {
        self.groups.iter().flatten().copied().collect()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Commit a lasso candidate. Returns `false` (and changes nothing) for an
    /// empty candidate.
    pub fn apply(&mut self, candidate: Vec<usize>, mode: SelectionMode) -> bool {
        if candidate.is_empty() {
            return false;
        }

        let claimed: HashSet<usize> = candidate.iter().copied().collect();
        for group in &mut self.groups {
            group.retain(|idx| !claimed.contains(idx));
        }

        match mode {
            SelectionMode::Multi => self.groups.push(candidate),
            SelectionMode::Single => self.groups = vec![candidate],
        }
        true
    }

    /// Per-group colour assignment for the renderer
    pub fn styles(&self) -> Vec<GroupStyle> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, indices)| GroupStyle {
                group: i,
                color: palette::group_color(i).to_string(),
                indices: indices.clone(),
            })
            .collect()
    }

    /// Owned copy of the groups for a result record
    pub fn snapshot(&self) -> Vec<Vec<usize>> {
        self.groups.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_appends_and_strips_claimed_indices() {
        let mut state = SelectionState::new();
        assert!(state.apply(vec![0, 1, 2, 3], SelectionMode::Multi));
        assert!(state.apply(vec![3, 4, 5], SelectionMode::Multi));

        assert_eq!(state.groups(), &[vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_single_replaces() {
        let mut state = SelectionState::new();
        state.apply(vec![1, 2], SelectionMode::Single);
        state.apply(vec![7, 8], SelectionMode::Single);
        assert_eq!(state.groups(), &[vec![7, 8]]);
    }

    #[test]
    fn test_empty_candidate_is_ignored() {
        let mut state = SelectionState::new();
        state.apply(vec![1, 2], SelectionMode::Multi);
        let before = state.clone();
        assert!(!state.apply(Vec::new(), SelectionMode::Multi));
        assert_eq!(state, before);
    }

    #[test]
    fn test_fully_reclaimed_group_keeps_its_slot() {
        let mut state = SelectionState::new();
        state.apply(vec![1, 2], SelectionMode::Multi);
        state.apply(vec![5, 6], SelectionMode::Multi);
        state.apply(vec![1, 2], SelectionMode::Multi);

        assert_eq!(state.groups(), &[vec![], vec![5, 6], vec![1, 2]]);
        let styles = state.styles();
        assert_eq!(styles[1].color, palette::group_color(1));
        assert_eq!(styles[2].indices, vec![1, 2]);
    }

    #[test]
    fn test_union_and_has_selection() {
        let mut state = SelectionState::new();
        assert!(!state.has_selection());
        state.apply(vec![4, 2], SelectionMode::Multi);
        state.apply(vec![9], SelectionMode::Multi);
        assert!(state.has_selection());
        assert_eq!(state.union().into_iter().collect::<Vec<_>>(), vec![2, 4, 9]);
    }

    #[test]
    fn test_serializes_as_nested_arrays() {
        let mut state = SelectionState::new();
        state.apply(vec![0, 1], SelectionMode::Multi);
        state.apply(vec![5], SelectionMode::Multi);
        assert_eq!(serde_json::to_string(&state).unwrap(), "[[0,1],[5]]");
    }
}

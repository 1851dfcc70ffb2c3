//! Scripted sanity checks
//!
//! Every lasso block opens with a synthetic scatterplot whose correct answer is
//! known in advance. Clusters are drawn uniformly inside fixed boxes of the
//! unit square (scaled to the viewport), `cluster_size` points each, labelled
//! and indexed cluster by cluster: cluster `c` owns the index range
//! `[c * n, (c + 1) * n)`.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeSet;
use std::ops::Range;

use rand::Rng;

use crate::config::Viewport;
use crate::geometry::Position;
use crate::scene::{Fill, Point, Scene, ScenePoint};
use crate::selection::SelectionState;
use crate::study::task::TaskKind;

/// Point radius used for sanity scenes
pub const SANITY_POINT_RADIUS: f64 = 4.0;

/// Axis-aligned box in unit coordinates: `origin + U[0, size)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterBox {
    pub origin: (f64, f64),
    pub size: (f64, f64),
}

impl ClusterBox {
    const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { origin: (x, y), size: (w, h) }
    }

    /// Whether a unit-square coordinate lies within the box
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.origin.0
            && x < self.origin.0 + self.size.0
            && y >= self.origin.1
            && y < self.origin.1 + self.size.1
    }
}

/// Reference marking of a sanity scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityHighlight {
    None,

    /// One point of a cluster, `offset` positions into it
    Point { cluster: usize, offset: usize },

    /// A whole cluster
    Cluster(usize),
}

/// Synthetic scene description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanityLayout {
    pub clusters: &'static [ClusterBox],
    pub highlight: SanityHighlight,
}

const SEPARATED: [ClusterBox; 2] = [
    ClusterBox::new(0.2, 0.2, 0.2, 0.2),
    ClusterBox::new(0.6, 0.6, 0.2, 0.2),
];

const SEPARATED_WITH_NEIGHBOUR: [ClusterBox; 3] = [
    ClusterBox::new(0.2, 0.2, 0.2, 0.2),
    ClusterBox::new(0.6, 0.6, 0.2, 0.2),
    ClusterBox::new(0.4, 0.6, 0.2, 0.2),
];

const VARYING_DENSITY: [ClusterBox; 3] = [
    ClusterBox::new(0.25, 0.25, 0.05, 0.05),
    ClusterBox::new(0.6, 0.6, 0.2, 0.2),
    ClusterBox::new(0.4, 0.2, 0.1, 0.1),
];

/// Two well separated clusters (cluster identification)
pub const TWO_SEPARATED: SanityLayout = SanityLayout {
    clusters: &SEPARATED,
    highlight: SanityHighlight::None,
};

/// Three clusters, one point of the second in red (membership)
pub const THREE_WITH_REFERENCE_POINT: SanityLayout = SanityLayout {
    clusters: &SEPARATED_WITH_NEIGHBOUR,
    highlight: SanityHighlight::Point { cluster: 1, offset: 30 },
};

/// Tight, loose and medium clusters; the tight one in red (nearest cluster)
pub const THREE_WITH_REFERENCE_CLUSTER: SanityLayout = SanityLayout {
    clusters: &VARYING_DENSITY,
    highlight: SanityHighlight::Cluster(0),
};

/// Tight, loose and medium clusters, unmarked (density)
pub const THREE_VARYING_DENSITY: SanityLayout = SanityLayout {
    clusters: &VARYING_DENSITY,
    highlight: SanityHighlight::None,
};

impl SanityLayout {
    /// Index of the highlighted point, if any
    pub fn highlighted_point(&self, cluster_size: usize) -> Option<usize> {
        match self.highlight {
            SanityHighlight::Point { cluster, offset } => {
                Some(cluster * cluster_size + offset.min(cluster_size.saturating_sub(1)))
            }
            _ => None,
        }
    }

    /// Draw a fresh random instance of the layout
    pub fn generate<R: Rng + ?Sized>(
        &self,
        task: TaskKind,
        viewport: &Viewport,
        cluster_size: usize,
        rng: &mut R,
    ) -> Scene {
        let marked_point = self.highlighted_point(cluster_size);
        let mut points = Vec::with_capacity(self.clusters.len() * cluster_size);

        for (cluster, bounds) in self.clusters.iter().enumerate() {
            for _ in 0..cluster_size {
                let ux = bounds.origin.0 + rng.gen::<f64>() * bounds.size.0;
                let uy = bounds.origin.1 + rng.gen::<f64>() * bounds.size.1;
                let index = points.len();
                let fill = match self.highlight {
                    SanityHighlight::Cluster(c) if c == cluster => Fill::Highlight,
                    SanityHighlight::Point { .. } if marked_point == Some(index) => Fill::Highlight,
                    _ => Fill::Neutral,
                };
                points.push(ScenePoint {
                    point: Point {
                        data: Position::new(ux, uy),
                        screen: Position::new(ux * viewport.width, uy * viewport.height),
                        cluster_label: cluster as i64,
                        original_index: index,
                    },
                    fill,
                });
            }
        }

        Scene {
            task,
            sanity: true,
            points,
            emphasised: None,
            radius: SANITY_POINT_RADIUS,
        }
    }
}

fn cluster_range(cluster: usize, n: usize) -> Range<usize> {
    cluster * n..(cluster + 1) * n
}

fn union_equals(selection: &SelectionState, expected: Range<usize>) -> bool {
    let expected: BTreeSet<usize> = expected.collect();
    selection.union() == expected
}

fn group_equals(group: &[usize], expected: &BTreeSet<usize>) -> bool {
    let set: BTreeSet<usize> = group.iter().copied().collect();
    set.len() == group.len() && &set == expected
}

/// Exactly two groups, one equal to cluster 0 and one equal to cluster 1,
/// in either order
pub fn two_clusters_identified(selection: &SelectionState, n: usize) -> bool {
    if selection.len() != 2 {
        return false;
    }
    let first: BTreeSet<usize> = cluster_range(0, n).collect();
    let second: BTreeSet<usize> = cluster_range(1, n).collect();
    let groups = selection.groups();
    groups.iter().any(|g| group_equals(g, &first)) && groups.iter().any(|g| group_equals(g, &second))
}

/// Union equals clusters 1 and 2, `[n, 3n)`
pub fn member_cluster_selected(selection: &SelectionState, n: usize) -> bool {
    union_equals(selection, n..3 * n)
}

/// Union equals cluster 2, `[2n, 3n)`
pub fn nearest_cluster_selected(selection: &SelectionState, n: usize) -> bool {
    union_equals(selection, cluster_range(2, n))
}

/// Union equals cluster 0, `[0, n)`
pub fn densest_cluster_selected(selection: &SelectionState, n: usize) -> bool {
    union_equals(selection, cluster_range(0, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMode;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn select(groups: &[Range<usize>], mode: SelectionMode) -> SelectionState {
        let mut state = SelectionState::new();
        for g in groups {
            state.apply(g.clone().collect(), mode);
        }
        state
    }

    #[test]
    fn test_cluster_identification_requires_separate_groups() {
        let separate = select(&[0..50, 50..100], SelectionMode::Multi);
        assert!(two_clusters_identified(&separate, 50));

        let reversed = select(&[50..100, 0..50], SelectionMode::Multi);
        assert!(two_clusters_identified(&reversed, 50));

        let merged = select(&[0..100], SelectionMode::Multi);
        assert!(!two_clusters_identified(&merged, 50));

        let partial = select(&[0..49, 50..100], SelectionMode::Multi);
        assert!(!two_clusters_identified(&partial, 50));
    }

    #[test]
    fn test_cluster_identification_rejects_emptied_extra_group() {
        // Lassoing cluster 0 twice leaves an empty first group behind.
        let state = select(&[0..50, 0..50, 50..100], SelectionMode::Multi);
        assert!(!two_clusters_identified(&state, 50));
    }

    #[test]
    fn test_membership_answer_key() {
        let full = select(&[50..150], SelectionMode::Single);
        assert!(member_cluster_selected(&full, 50));

        let short = select(&[50..120], SelectionMode::Single);
        assert!(!member_cluster_selected(&short, 50));

        let excess = select(&[40..150], SelectionMode::Single);
        assert!(!member_cluster_selected(&excess, 50));
    }

    #[test]
    fn test_nearest_and_density_answer_keys() {
        assert!(nearest_cluster_selected(&select(&[100..150], SelectionMode::Single), 50));
        assert!(!nearest_cluster_selected(&select(&[0..50], SelectionMode::Single), 50));
        assert!(densest_cluster_selected(&select(&[0..50], SelectionMode::Single), 50));
        assert!(!densest_cluster_selected(&SelectionState::new(), 50));
    }

    #[test]
    fn test_generated_points_stay_in_their_boxes() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let viewport = Viewport::default();
        let scene = THREE_WITH_REFERENCE_POINT.generate(TaskKind::E2, &viewport, 50, &mut rng);

        assert_eq!(scene.len(), 150);
        for sp in &scene.points {
            let label = sp.point.cluster_label as usize;
            assert_eq!(label, sp.point.original_index / 50);
            assert!(SEPARATED_WITH_NEIGHBOUR[label].contains(sp.point.data.x, sp.point.data.y));
        }
        let red: Vec<usize> = scene
            .points
            .iter()
            .filter(|p| p.fill == Fill::Highlight)
            .map(|p| p.point.original_index)
            .collect();
        assert_eq!(red, vec![80]);
    }

    #[test]
    fn test_reference_cluster_is_highlighted() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let scene = THREE_WITH_REFERENCE_CLUSTER.generate(TaskKind::E3, &Viewport::default(), 50, &mut rng);
        let red = scene.points.iter().filter(|p| p.fill == Fill::Highlight).count();
        assert_eq!(red, 50);
        assert!(scene.points[..50].iter().all(|p| p.fill == Fill::Highlight));
    }
}

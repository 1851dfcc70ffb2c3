//! Rendered point sets
//!
//! A scene is what the rendering collaborator draws for one sanity check or
//! trial: every point's data coordinates, its derived screen position, its
//! cluster label, and the fill it should be drawn with. Only
//! `original_index` ever leaves the scene in recorded selections; screen
//! positions are display-only.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::selection::palette;
use crate::study::task::TaskKind;

/// One labeled point of a loaded dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Coordinates as delivered by the projection
    pub data: Position,

    /// Derived drawing position
    pub screen: Position,

    /// Ground-truth cluster label
    pub cluster_label: i64,

    /// Stable identity used in every recorded selection
    pub original_index: usize,
}

/// Fill applied to a point before any selection outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    /// Neutral grey
    Neutral,

    /// Red highlight marking the task's reference point or cluster
    Highlight,

    /// Palette slot of the point's cluster label
    Label(usize),
}

impl Fill {
    pub fn css(&self) -> &'static str {
        match self {
            Fill::Neutral => "grey",
            Fill::Highlight => "red",
            Fill::Label(slot) => palette::color(*slot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub point: Point,
    pub fill: Fill,
}

/// Everything the renderer needs to draw one interactive scatterplot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Task the scene is presented for
    pub task: TaskKind,

    /// Whether this is the scripted sanity check of the block
    pub sanity: bool,

    /// Points in original-index order
    pub points: Vec<ScenePoint>,

    /// Point drawn with an extra emphasised marker (membership tasks)
    pub emphasised: Option<usize>,

    /// Point radius in pixels
    pub radius: f64,
}

impl Scene {
    /// The bare points, for hit-testing
    pub fn points(&self) -> Vec<Point> {
        self.points.iter().map(|p| p.point).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

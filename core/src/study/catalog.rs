//! Projection catalog, trial program and trial payloads
//!
//! The data-access collaborator publishes a catalog mapping every dataset to
//! the projections computed for it. At study start the catalog is expanded
//! into one shuffled trial list per lasso task; during the study each trial's
//! coordinates and labels are fetched on demand and turned into a [`Scene`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;

use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{StudyConfig, Viewport};
use crate::geometry::{Extent, LinearScale, Position};
use crate::scene::{Fill, Point, Scene, ScenePoint};
use crate::selection::palette;
use crate::study::task::{HighlightRule, TaskKind};

/// Point radius used for trial scenes
pub const TRIAL_POINT_RADIUS: f64 = 3.5;

/// Point radius used for ranking thumbnails
pub const THUMBNAIL_POINT_RADIUS: f64 = 2.5;

/// Malformed trial payloads
#[derive(Debug, Error, PartialEq)]
pub enum TrialDataError {
    /// Coordinate and label arrays differ in length
    #[error("Trial data has {points} coordinates but {labels} labels")]
    LengthMismatch { points: usize, labels: usize },

    /// No points at all
    #[error("Trial data for {dataset}/{projection} contains no points")]
    Empty { dataset: String, projection: String },
}

/// `dataset -> [projection]` as served by the catalog endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(pub BTreeMap<String, Vec<String>>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<D, P, I>(&mut self, dataset: D, projections: I)
    where
        D: Into<String>,
        P: Into<String>,
        I: IntoIterator<Item = P>,
    {
        self.0
            .insert(dataset.into(), projections.into_iter().map(Into::into).collect());
    }

    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn projections(&self, dataset: &str) -> &[String] {
        self.0.get(dataset).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One dataset/projection pair presented for one task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trial {
    pub dataset: String,
    pub projection: String,
    pub task: TaskKind,
}

/// Shuffled trial lists for the four lasso blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialProgram {
    blocks: BTreeMap<TaskKind, Vec<Trial>>,

    /// Accepted projections per dataset, in catalog order
    projections: BTreeMap<String, Vec<String>>,
}

impl TrialProgram {
    /// Cross the catalog's datasets and accepted projections with every lasso
    /// task, shuffling each task's list independently.
    pub fn build<R: Rng + ?Sized>(catalog: &Catalog, config: &StudyConfig, rng: &mut R) -> Self {
        let mut projections: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (dataset, names) in &catalog.0 {
            let accepted: Vec<String> = names
                .iter()
                .filter(|p| config.accepts_projection(p))
                .cloned()
                .collect();
            if !accepted.is_empty() {
                projections.insert(dataset.clone(), accepted);
            }
        }

        let mut blocks = BTreeMap::new();
        for task in TaskKind::BLOCKS {
            let mut trials: Vec<Trial> = projections
                .iter()
                .flat_map(|(dataset, names)| {
                    names.iter().map(move |projection| Trial {
                        dataset: dataset.clone(),
                        projection: projection.clone(),
                        task,
                    })
                })
                .collect();
            trials.shuffle(rng);
            blocks.insert(task, trials);
        }

        let program = Self { blocks, projections };
        info!(
            "trial program built: {} datasets, {} trials per block",
            program.projections.len(),
            program.block(TaskKind::E1).len()
        );
        program
    }

    /// Trials of one block in presentation order
    pub fn block(&self, task: TaskKind) -> &[Trial] {
        self.blocks.get(&task).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn trial(&self, task: TaskKind, index: usize) -> Option<&Trial> {
        self.block(task).get(index)
    }

    /// Sum of trials over every block
    pub fn total_trials(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    /// Datasets that received at least one accepted projection
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.projections.keys().map(String::as_str)
    }

    pub fn projections(&self, dataset: &str) -> &[String] {
        self.projections.get(dataset).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Reference pair named by the data endpoint for nearest-cluster trials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearestPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_cluster: Option<i64>,
}

/// Payload of the trial data endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialData {
    /// Projected coordinates, one pair per point
    #[serde(rename = "X")]
    pub coordinates: Vec<[f64; 2]>,

    /// Cluster label per point
    #[serde(rename = "y")]
    pub labels: Vec<i64>,

    /// Point to highlight in membership trials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst_point_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_pair: Option<NearestPair>,
}

impl TrialData {
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Check that the payload describes at least one labelled point
    pub fn validate(&self, trial: &Trial) -> Result<(), TrialDataError> {
        self.validate_for(&trial.dataset, &trial.projection)
    }

    /// Same checks for data fetched outside a trial
    pub fn validate_for(&self, dataset: &str, projection: &str) -> Result<(), TrialDataError> {
        if self.coordinates.len() != self.labels.len() {
            return Err(TrialDataError::LengthMismatch {
                points: self.coordinates.len(),
                labels: self.labels.len(),
            });
        }
        if self.coordinates.is_empty() {
            return Err(TrialDataError::Empty {
                dataset: dataset.to_string(),
                projection: projection.to_string(),
            });
        }
        Ok(())
    }

    /// Reference cluster label of a nearest-cluster trial
    pub fn nearest_cluster(&self) -> Option<i64> {
        self.nearest_pair.as_ref().and_then(|p| p.nearest_cluster)
    }

    /// Point highlighted for membership tasks: the served
    /// `worst_point_index` when it addresses a point, otherwise a uniformly
    /// random one. `None` only for an empty payload.
    pub fn resolve_highlight<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        match self.worst_point_index {
            Some(idx) if idx >= 0 && (idx as usize) < self.len() => Some(idx as usize),
            other => {
                let fallback = rng.gen_range(0..self.len());
                warn!(
                    "no valid worst_point_index ({:?}), highlighting random point {}",
                    other, fallback
                );
                Some(fallback)
            }
        }
    }

    /// Project the payload onto the viewport and colour it for `task`.
    ///
    /// x spans `[padding, width - padding]`, y is flipped onto
    /// `[height - padding, padding]`.
    pub fn to_scene(&self, task: TaskKind, viewport: &Viewport, highlight: Option<usize>) -> Scene {
        let x_extent = Extent::of(self.coordinates.iter().map(|c| c[0])).unwrap_or(Extent::new(0.0, 0.0));
        let y_extent = Extent::of(self.coordinates.iter().map(|c| c[1])).unwrap_or(Extent::new(0.0, 0.0));
        let x = LinearScale::new(x_extent, (viewport.padding, viewport.width - viewport.padding));
        let y = LinearScale::new(y_extent, (viewport.height - viewport.padding, viewport.padding));

        let rule = task.spec().highlight;
        let reference_cluster = self.nearest_cluster();

        let points = self
            .coordinates
            .iter()
            .zip(&self.labels)
            .enumerate()
            .map(|(i, (c, &label))| {
                let fill = match rule {
                    HighlightRule::None => Fill::Neutral,
                    HighlightRule::ReferencePoint if highlight == Some(i) => Fill::Highlight,
                    HighlightRule::ReferencePoint => Fill::Neutral,
                    HighlightRule::ReferenceCluster => match reference_cluster {
                        Some(cluster) if cluster == label => Fill::Highlight,
                        Some(_) => Fill::Neutral,
                        None => Fill::Label(palette::label_slot(label)),
                    },
                };
                ScenePoint {
                    point: Point {
                        data: Position::new(c[0], c[1]),
                        screen: Position::new(x.apply(c[0]), y.apply(c[1])),
                        cluster_label: label,
                        original_index: i,
                    },
                    fill,
                }
            })
            .collect();

        Scene {
            task,
            sanity: false,
            points,
            emphasised: if rule == HighlightRule::ReferencePoint { highlight } else { None },
            radius: TRIAL_POINT_RADIUS,
        }
    }

    /// Grey, non-interactive plot for a ranking page
    pub fn to_thumbnail(&self, viewport: &Viewport) -> Scene {
        Scene {
            radius: THUMBNAIL_POINT_RADIUS,
            ..self.to_scene(TaskKind::E5, viewport, None)
        }
    }
}

//! Final projection ranking
//!
//! After the four lasso blocks the participant ranks, dataset by dataset,
//! every projection of that dataset on a `1..=max_rank` scale. Ranks are
//! independent per projection (ties allowed) and may be left blank.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::study::catalog::TrialProgram;

/// `dataset -> projection -> rank`
pub type RankingMatrix = BTreeMap<String, BTreeMap<String, u8>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingError {
    /// Rank outside `1..=max_rank`
    #[error("Rank {rank} outside 1..={max_rank}")]
    OutOfRange { rank: u8, max_rank: u8 },

    /// Projection not shown on the current page
    #[error("Projection {projection} is not ranked on the page for {dataset}")]
    UnknownProjection { dataset: String, projection: String },

    /// Ranking requested with no page left
    #[error("No ranking page is open")]
    NoPage,
}

/// What the renderer shows for one ranking page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPage {
    pub dataset: String,

    /// Instruction line matching the configured rank scale
    pub instructions: String,

    /// Projections in this page's randomised order
    pub projections: Vec<String>,

    /// Ranks already chosen on this page
    pub ranks: BTreeMap<String, u8>,

    /// Zero-based page number
    pub page: usize,

    pub page_count: usize,

    pub max_rank: u8,

    /// The advance control submits instead of paging forward
    pub is_last: bool,
}

/// Ranking instructions for a `1..=max_rank` scale
pub fn instructions(max_rank: u8) -> String {
    format!("Rank all projections from 1 (best) to {max_rank} (worst). Same ranks allowed.")
}

/// Paginated ranking state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPhase {
    pages: Vec<(String, Vec<String>)>,
    page: usize,
    matrix: RankingMatrix,
    max_rank: u8,
}

impl RankingPhase {
    /// One page per dataset of the program, each with an independently
    /// shuffled projection order
    pub fn new<R: Rng + ?Sized>(program: &TrialProgram, max_rank: u8, rng: &mut R) -> Self {
        let mut pages = Vec::new();
        let mut matrix = RankingMatrix::new();
        for dataset in program.datasets() {
            let mut order = program.projections(dataset).to_vec();
            order.shuffle(rng);
            pages.push((dataset.to_string(), order));
            matrix.insert(dataset.to_string(), BTreeMap::new());
        }
        Self {
            pages,
            page: 0,
            matrix,
            max_rank,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn is_last_page(&self) -> bool {
        self.page + 1 >= self.pages.len()
    }

    pub fn current_page(&self) -> Option<RankingPage> {
        let (dataset, projections) = self.pages.get(self.page)?;
        Some(RankingPage {
            dataset: dataset.clone(),
            instructions: instructions(self.max_rank),
            projections: projections.clone(),
            ranks: self.matrix.get(dataset).cloned().unwrap_or_default(),
            page: self.page,
            page_count: self.pages.len(),
            max_rank: self.max_rank,
            is_last: self.is_last_page(),
        })
    }

    /// Set (or with `None`, clear) the rank of a projection on the current page
    pub fn set_rank(&mut self, projection: &str, rank: Option<u8>) -> Result<(), RankingError> {
        let (dataset, projections) = self.pages.get(self.page).ok_or(RankingError::NoPage)?;
        if !projections.iter().any(|p| p == projection) {
            return Err(RankingError::UnknownProjection {
                dataset: dataset.clone(),
                projection: projection.to_string(),
            });
        }
        if let Some(rank) = rank {
            if rank == 0 || rank > self.max_rank {
                return Err(RankingError::OutOfRange { rank, max_rank: self.max_rank });
            }
        }

        let ranks = self.matrix.entry(dataset.clone()).or_default();
        match rank {
            Some(rank) => {
                ranks.insert(projection.to_string(), rank);
            }
            None => {
                ranks.remove(projection);
            }
        }
        Ok(())
    }

    /// Move to the next page; `false` when already on the last one
    pub fn next_page(&mut self) -> bool {
        if self.is_last_page() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn matrix(&self) -> &RankingMatrix {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudyConfig;
    use crate::study::catalog::Catalog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn phase() -> RankingPhase {
        let mut catalog = Catalog::new();
        catalog.insert("iris", ["tsne", "umap", "pca"]);
        catalog.insert("wine", ["mds", "labels"]);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let program = TrialProgram::build(&catalog, &StudyConfig::default(), &mut rng);
        RankingPhase::new(&program, 10, &mut rng)
    }

    #[test]
    fn test_one_page_per_dataset() {
        let mut phase = phase();
        assert_eq!(phase.page_count(), 2);

        let first = phase.current_page().unwrap();
        assert_eq!(first.dataset, "iris");
        let mut sorted = first.projections.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["pca", "tsne", "umap"]);
        assert!(!first.is_last);

        assert!(phase.next_page());
        let second = phase.current_page().unwrap();
        assert_eq!(second.projections, vec!["mds"]);
        assert!(second.is_last);
        assert!(!phase.next_page());
    }

    #[test]
    fn test_ranks_allow_ties_and_clearing() {
        let mut phase = phase();
        phase.set_rank("tsne", Some(1)).unwrap();
        phase.set_rank("umap", Some(1)).unwrap();
        phase.set_rank("pca", Some(10)).unwrap();
        phase.set_rank("pca", None).unwrap();

        let iris = &phase.matrix()["iris"];
        assert_eq!(iris.len(), 2);
        assert_eq!(iris["tsne"], 1);
        assert_eq!(iris["umap"], 1);
    }

    #[test]
    fn test_rejects_out_of_range_and_foreign_projection() {
        let mut phase = phase();
        assert_eq!(
            phase.set_rank("tsne", Some(11)),
            Err(RankingError::OutOfRange { rank: 11, max_rank: 10 })
        );
        assert!(phase.set_rank("tsne", Some(0)).is_err());
        assert!(matches!(
            phase.set_rank("mds", Some(2)),
            Err(RankingError::UnknownProjection { .. })
        ));
    }

    #[test]
    fn test_instructions_follow_rank_scale() {
        let mut catalog = Catalog::new();
        catalog.insert("iris", ["tsne"]);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let program = TrialProgram::build(&catalog, &StudyConfig::default(), &mut rng);
        let page = RankingPhase::new(&program, 5, &mut rng).current_page().unwrap();
        assert_eq!(
            page.instructions,
            "Rank all projections from 1 (best) to 5 (worst). Same ranks allowed."
        );
    }

    #[test]
    fn test_unranked_dataset_still_present_in_matrix() {
        let phase = phase();
        assert!(phase.matrix()["wine"].is_empty());
    }
}

//! Study configuration
//!
//! A single serde-friendly value describing every tunable of a study run:
//! drawing surface, ranking scale, the empty-selection policy, catalog
//! filtering and the random seed.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Drawing surface too small for its padding
    #[error("Viewport {width}x{height} cannot hold a padding of {padding} on each side")]
    ViewportTooSmall { width: f64, height: f64, padding: f64 },

    /// Ranking scale must offer at least one rank
    #[error("Maximum rank must be at least 1, got {0}")]
    InvalidRankScale(u8),

    /// Sanity clusters must contain points
    #[error("Sanity cluster size must be positive")]
    EmptySanityCluster,
}

/// What happens when a participant advances a trial with nothing selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelectionPolicy {
    /// Refuse the advance and show a notice
    Block,

    /// Record the empty selection and move on
    Allow,
}

impl Default for EmptySelectionPolicy {
    fn default() -> Self {
        EmptySelectionPolicy::Block
    }
}

/// Scatterplot drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f64,

    /// Height in pixels
    pub height: f64,

    /// Margin between the plot edge and the outermost trial point
    pub padding: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 40.0,
        }
    }
}

impl Viewport {
    /// Square plot next to each rank selector on the ranking pages
    pub const THUMBNAIL: Viewport = Viewport {
        width: 200.0,
        height: 200.0,
        padding: 10.0,
    };

    fn check(&self) -> Result<(), ConfigError> {
        let Viewport { width, height, padding } = *self;
        if !(width > 2.0 * padding && height > 2.0 * padding) || padding < 0.0 {
            return Err(ConfigError::ViewportTooSmall { width, height, padding });
        }
        Ok(())
    }
}

/// Complete study configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Drawing surface shared by sanity checks and trials
    pub viewport: Viewport,

    /// Drawing surface of the ranking thumbnails
    pub thumbnail: Viewport,

    /// Highest rank offered on the ranking pages (ranks are `1..=max_rank`)
    pub max_rank: u8,

    /// Handling of an advance with an empty selection
    pub empty_selection_policy: EmptySelectionPolicy,

    /// Projections starting with any of these prefixes are reserved for
    /// other tasks and never become trials
    pub reserved_projection_prefixes: Vec<String>,

    /// Catalog entries that are not projections at all
    pub ignored_projection_names: Vec<String>,

    /// Points per synthetic sanity cluster
    pub sanity_cluster_size: usize,

    /// Seed for every random decision; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            thumbnail: Viewport::THUMBNAIL,
            max_rank: 10,
            empty_selection_policy: EmptySelectionPolicy::default(),
            reserved_projection_prefixes: vec!["E2_".into(), "E3_".into(), "E4_".into()],
            ignored_projection_names: vec!["labels".into()],
            sanity_cluster_size: 50,
            seed: None,
        }
    }
}

impl StudyConfig {
    /// Same configuration with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_empty_selection_policy(mut self, policy: EmptySelectionPolicy) -> Self {
        self.empty_selection_policy = policy;
        self
    }

    /// Check invariants the sequencer relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.check()?;
        self.thumbnail.check()?;
        if self.max_rank == 0 {
            return Err(ConfigError::InvalidRankScale(self.max_rank));
        }
        if self.sanity_cluster_size == 0 {
            return Err(ConfigError::EmptySanityCluster);
        }
        Ok(())
    }

    /// Whether a catalog entry is a usable trial projection
    pub fn accepts_projection(&self, projection: &str) -> bool {
        !self.ignored_projection_names.iter().any(|n| n == projection)
            && !self
                .reserved_projection_prefixes
                .iter()
                .any(|prefix| projection.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StudyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.empty_selection_policy, EmptySelectionPolicy::Block);
        assert_eq!(config.max_rank, 10);
    }

    #[test]
    fn test_rejects_small_viewport() {
        let mut config = StudyConfig::default();
        config.viewport = Viewport { width: 60.0, height: 600.0, padding: 40.0 };
        assert!(matches!(config.validate(), Err(ConfigError::ViewportTooSmall { .. })));

        let mut config = StudyConfig::default();
        config.thumbnail.padding = 100.0;
        assert!(matches!(config.validate(), Err(ConfigError::ViewportTooSmall { .. })));
    }

    #[test]
    fn test_rejects_zero_rank_scale() {
        let config = StudyConfig { max_rank: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidRankScale(0)));
    }

    #[test]
    fn test_projection_filter() {
        let config = StudyConfig::default();
        assert!(config.accepts_projection("tsne"));
        assert!(config.accepts_projection("umap_E2"));
        assert!(!config.accepts_projection("labels"));
        assert!(!config.accepts_projection("E3_tsne"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: StudyConfig =
            serde_json::from_str(r#"{"empty_selection_policy":"allow","seed":7}"#).unwrap();
        assert_eq!(config.empty_selection_policy, EmptySelectionPolicy::Allow);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.viewport, Viewport::default());
        assert_eq!(config.thumbnail, Viewport::THUMBNAIL);
    }
}

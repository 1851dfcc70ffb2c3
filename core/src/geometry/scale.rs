//! Linear data-to-pixel scales for projection scatterplots
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

/// Closed numeric interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest interval covering every finite value, `None` if there is none
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Extent>, v| match acc {
                None => Some(Extent::new(v, v)),
                Some(e) => Some(Extent::new(e.min.min(v), e.max.max(v))),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        self.min + self.span() / 2.0
    }
}

/// Affine map from a data domain onto a pixel range.
///
/// The range may be inverted (`start > end`), which is how the y axis is
/// flipped so that larger data values are drawn higher up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain: Extent,
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: Extent, range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> Extent {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a data value to pixels. A zero-width domain maps everything to
    /// the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        let span = self.domain.span();
        let t = if span == 0.0 {
            0.5
        } else {
            (value - self.domain.min) / span
        };
        r0 + t * (r1 - r0)
    }
}

//! Lasso polygon and even-odd containment
//!
//! The lasso boundary is an open sequence of raw pointer samples; it is closed
//! implicitly between the last and the first vertex. Containment follows the
//! even-odd ray casting rule with half-open vertical comparisons, matching the
//! charting library used to render the study so that points lying exactly on
//! a boundary resolve the same way on both sides.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use super::Position;

/// Freehand polygon accumulated from pointer samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Position>,
}

impl Polygon {
    /// Create an empty polygon
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a polygon at a single vertex
    pub fn starting_at(origin: Position) -> Self {
        Self { vertices: vec![origin] }
    }

    /// Append a raw sample; no deduplication or simplification is applied
    pub fn push(&mut self, vertex: Position) {
        self.vertices.push(vertex);
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Test whether `point` lies inside the implicitly closed polygon
    pub fn contains(&self, point: Position) -> bool {
        polygon_contains(&self.vertices, point)
    }

    /// SVG path data for the lasso outline (`M x,y L x,y ... Z`)
    pub fn to_path_data(&self) -> Option<String> {
        if self.vertices.is_empty() {
            return None;
        }
        let segments: Vec<String> = self
            .vertices
            .iter()
            .map(|v| format!("{},{}", v.x, v.y))
            .collect();
        Some(format!("M{}Z", segments.join("L")))
    }
}

impl FromIterator<Position> for Polygon {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self { vertices: iter.into_iter().collect() }
    }
}

/// Even-odd containment test over an implicitly closed vertex ring.
///
/// Each edge `(v_prev, v_i)` toggles the result when it straddles the
/// horizontal line through `point` (`(y_i > y) != (y_prev > y)`) and the
/// crossing lies strictly to the right of `point`.
pub fn polygon_contains(vertices: &[Position], point: Position) -> bool {
    let Some(last) = vertices.last() else {
        return false;
    };

    let (x, y) = (point.x, point.y);
    let (mut x0, mut y0) = (last.x, last.y);
    let mut inside = false;

    for vertex in vertices {
        let (x1, y1) = (vertex.x, vertex.y);
        if (y1 > y) != (y0 > y) && x < (x0 - x1) * (y - y1) / (y0 - y1) + x1 {
            inside = !inside;
        }
        x0 = x1;
        y0 = y1;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Polygon {
        [(min, min), (max, min), (max, max), (min, max)]
            .into_iter()
            .map(Position::from)
            .collect()
    }

    #[test]
    fn test_square_containment() {
        let poly = square(0.0, 10.0);
        assert!(poly.contains(Position::new(5.0, 5.0)));
        assert!(poly.contains(Position::new(0.5, 9.5)));
        assert!(!poly.contains(Position::new(-1.0, 5.0)));
        assert!(!poly.contains(Position::new(5.0, 11.0)));
    }

    #[test]
    fn test_degenerate_polygons_contain_nothing() {
        let origin = Position::new(1.0, 1.0);
        assert!(!Polygon::new().contains(origin));
        assert!(!Polygon::starting_at(origin).contains(origin));

        let mut segment = Polygon::starting_at(Position::new(0.0, 0.0));
        segment.push(Position::new(10.0, 10.0));
        assert!(!segment.contains(Position::new(2.0, 5.0)));
    }

    #[test]
    fn test_boundary_resolution_is_half_open() {
        let poly = square(0.0, 10.0);
        // Left and bottom edges are inside, right and top edges are outside.
        assert!(poly.contains(Position::new(0.0, 5.0)));
        assert!(poly.contains(Position::new(5.0, 0.0)));
        assert!(!poly.contains(Position::new(10.0, 5.0)));
        assert!(!poly.contains(Position::new(5.0, 10.0)));
    }

    #[test]
    fn test_self_intersecting_bowtie_uses_even_odd() {
        // Figure-eight: two lobes share the crossing at (5, 5).
        let bowtie: Polygon = [(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]
            .into_iter()
            .map(Position::from)
            .collect();
        assert!(bowtie.contains(Position::new(8.0, 5.0)));
        assert!(bowtie.contains(Position::new(2.0, 5.0)));
        assert!(!bowtie.contains(Position::new(5.0, 8.0)));
    }

    #[test]
    fn test_repeated_samples_do_not_change_result() {
        let mut poly = square(0.0, 10.0);
        poly.push(Position::new(0.0, 10.0));
        poly.push(Position::new(0.0, 10.0));
        assert!(poly.contains(Position::new(5.0, 5.0)));
        assert!(!poly.contains(Position::new(15.0, 5.0)));
    }

    #[test]
    fn test_path_data() {
        let mut poly = Polygon::starting_at(Position::new(1.0, 2.0));
        poly.push(Position::new(3.0, 4.0));
        assert_eq!(poly.to_path_data().as_deref(), Some("M1,2L3,4Z"));
        assert_eq!(Polygon::new().to_path_data(), None);
    }
}

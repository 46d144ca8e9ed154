//! Planar extent of a grid.

use serde::{Deserialize, Serialize};

use crate::PlanarPoint;

/// Axis-aligned rectangle in projected coordinates.
///
/// Containment is inclusive on every edge, so a station sitting exactly on
/// the outer boundary of the grid still counts as inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Check if a point lies inside the extent (edges included).
    pub fn contains(&self, point: &PlanarPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Width in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "X[{:.1}, {:.1}], Y[{:.1}, {:.1}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_edges() {
        let extent = Extent::new(0.0, 0.0, 20.0, 10.0);
        assert!(extent.contains(&PlanarPoint::new(0.0, 0.0)));
        assert!(extent.contains(&PlanarPoint::new(20.0, 10.0)));
        assert!(extent.contains(&PlanarPoint::new(10.0, 5.0)));
        assert!(!extent.contains(&PlanarPoint::new(20.000001, 5.0)));
        assert!(!extent.contains(&PlanarPoint::new(5.0, -0.1)));
    }

    #[test]
    fn test_display() {
        let extent = Extent::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(extent.to_string(), "X[1.0, 3.0], Y[2.0, 4.0]");
    }
}

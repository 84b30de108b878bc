use serde::{Deserialize, Serialize};

/// Numerical tolerances threaded through the repair pipeline and the
/// unfolder. Grouped into one struct so callers configure a single
/// coherent set rather than tuning each operator's epsilon independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Distance below which two vertices are welded into one during mesh
    /// construction and edge-collapse.
    pub weld: f64,
    /// Triangle area below which a triangle is considered degenerate.
    pub area: f64,
    /// Angular tolerance (radians) for "nearly parallel" / "nearly collinear"
    /// tests, e.g. opposite-face culling and coplanar classification.
    pub collinear: f64,
    /// Angular tolerance (radians) used when classifying two triangles as
    /// lying in the same plane for self-intersection handling.
    pub plane: f64,
    /// Distance tolerance for "on the same plane" point tests.
    pub coplanar: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            weld: 1e-7,
            area: 1e-10,
            collinear: 1e-6,
            plane: 1e-6,
            coplanar: 1e-7,
        }
    }
}

impl Tolerances {
    pub fn points_coincident(&self, a: &crate::Point3d, b: &crate::Point3d) -> bool {
        a.distance_to(b) <= self.weld
    }

    pub fn is_degenerate_area(&self, area: f64) -> bool {
        area <= self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerances_are_tight() {
        let t = Tolerances::default();
        assert!(t.weld < 1e-5);
        assert!(t.area < 1e-5);
    }
}

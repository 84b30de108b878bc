//! Thin `Result`-returning wrappers over [`crate::oracle`], for callers that
//! want `?` rather than inspecting an [`crate::oracle::OracleVerdict`].

use mesh_core::topology::TopologyIndex;
use mesh_core::TaggedMesh;
use mesh_types::Tolerances;
use sheet_metal::FlatPattern;

use crate::helpers::HarnessError;
use crate::oracle;

fn require(verdict: oracle::OracleVerdict) -> Result<(), HarnessError> {
    if verdict.passed {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed { reason: verdict.message })
    }
}

pub fn assert_closed_manifold(topo: &TopologyIndex) -> Result<(), HarnessError> {
    require(oracle::check_closed_manifold(topo))
}

pub fn assert_winding_consistent(mesh: &TaggedMesh, topo: &TopologyIndex) -> Result<(), HarnessError> {
    require(oracle::check_winding_consistent(mesh, topo))
}

pub fn assert_volume_within(mesh: &TaggedMesh, expected: f64, tol: f64) -> Result<(), HarnessError> {
    require(oracle::check_volume_within(mesh, expected, tol))
}

pub fn assert_no_degenerate_triangles(mesh: &TaggedMesh, tol: &Tolerances) -> Result<(), HarnessError> {
    require(oracle::check_no_degenerate_triangles(mesh, tol))
}

pub fn assert_flat_pattern_connected(pattern: &FlatPattern) -> Result<(), HarnessError> {
    require(oracle::check_flat_pattern_connected(pattern))
}

pub fn assert_flat_pattern_area_preserved(mesh: &TaggedMesh, pattern: &FlatPattern, tol: f64) -> Result<(), HarnessError> {
    require(oracle::check_flat_pattern_area_preserved(mesh, pattern, tol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    #[test]
    fn assert_closed_manifold_rejects_open_triangle() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let topo = TopologyIndex::build(&mesh);
        assert!(assert_closed_manifold(&topo).is_err());
    }
}

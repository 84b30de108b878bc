//! Shared error type and small numeric helpers used across the harness.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("assertion failed: {reason}")]
    AssertionFailed { reason: String },
    #[error("oracle check failed: {reason}")]
    OracleFailure { reason: String },
    #[error("STL export failed: {reason}")]
    StlError { reason: String },
    #[error("mesh error: {0}")]
    Mesh(#[from] mesh_types::MeshError),
}

/// Signed volume of the closed surface described by `triangles` via the
/// divergence theorem: `V = (1/6) * Σ p0 · (p1 × p2)` over every triangle,
/// origin-independent for a closed manifold.
pub fn signed_volume(positions: &[mesh_types::Point3d], triangles: &[[u32; 3]]) -> f64 {
    let mut sum = 0.0;
    for tri in triangles {
        let p0 = positions[tri[0] as usize].to_vec3();
        let p1 = positions[tri[1] as usize].to_vec3();
        let p2 = positions[tri[2] as usize].to_vec3();
        sum += p0.triple(&p1, &p2);
    }
    sum / 6.0
}

/// Total surface area of a triangle soup (positions + index triples).
pub fn total_area(positions: &[mesh_types::Point3d], triangles: &[[u32; 3]]) -> f64 {
    triangles
        .iter()
        .map(|tri| mesh_core::geom::triangle_area(positions[tri[0] as usize], positions[tri[1] as usize], positions[tri[2] as usize]))
        .sum()
}

//! §4.3.8 Remove Internal Triangles.

use mesh_types::{MeshError, Point3d, Vec3};

use crate::external::{raw_from_tagged_mesh, to_face_id};
use crate::geom::{ray_triangle_intersect, solid_angle, triangle_centroid, triangle_normal};
use crate::manifold::ManifoldEngine;
use crate::mesh::TaggedMesh;
use crate::ops::winding::fix_triangle_windings_by_adjacency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalStrategy {
    /// Round-trip through the external manifold-boolean engine: whatever
    /// shell it returns is adopted verbatim, face-ids preserved.
    Manifold,
    /// Cast rays along +X, +Y, +Z from each triangle's jittered centroid;
    /// majority-vote inside/outside across the three axes.
    RaycastVote,
    /// Generalized winding number via the van Oosterom-Strang solid angle,
    /// probed on both sides of each triangle along its normal.
    WindingNumber,
}

#[derive(Debug, Clone, Copy)]
pub struct InternalConfig {
    pub strategy: InternalStrategy,
    /// Strategy to fall back to if `Manifold` fails because the mesh is
    /// still non-manifold (§7 `TopologyFailure`).
    pub fallback: InternalStrategy,
    pub offset_scale: f64,
    pub crossing_tolerance: f64,
}

impl Default for InternalConfig {
    fn default() -> Self {
        Self {
            strategy: InternalStrategy::Manifold,
            fallback: InternalStrategy::RaycastVote,
            offset_scale: 1e-4,
            crossing_tolerance: 1e-9,
        }
    }
}

pub fn remove_internal_triangles(
    mesh: &mut TaggedMesh,
    cfg: &InternalConfig,
    engine: &mut dyn ManifoldEngine,
) -> Result<usize, MeshError> {
    let result = match cfg.strategy {
        InternalStrategy::Manifold => match manifold_rebuild(mesh, engine) {
            Ok(count) => Ok(count),
            Err(MeshError::ManifoldEngineFailed { reason }) => {
                tracing::warn!(reason, "manifold rebuild failed, falling back");
                apply_classification_strategy(mesh, cfg.fallback, cfg)
            }
            Err(other) => Err(other),
        },
        strategy => Ok(apply_classification_strategy(mesh, strategy, cfg)?),
    }?;

    if result > 0 {
        mesh.compact_vertices();
        fix_triangle_windings_by_adjacency(mesh);
    }
    Ok(result)
}

fn apply_classification_strategy(mesh: &mut TaggedMesh, strategy: InternalStrategy, cfg: &InternalConfig) -> usize {
    match strategy {
        InternalStrategy::RaycastVote => raycast_vote(mesh, cfg),
        InternalStrategy::WindingNumber => winding_number_classify(mesh, cfg),
        InternalStrategy::Manifold => 0,
    }
}

fn manifold_rebuild(mesh: &mut TaggedMesh, engine: &mut dyn ManifoldEngine) -> Result<usize, MeshError> {
    let before = mesh.triangle_count();
    let (raw, _) = raw_from_tagged_mesh(mesh);
    let handle = engine
        .build(&raw)
        .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
    let rebuilt = engine
        .get_mesh(handle)
        .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
    engine.delete(handle);

    let mut new_positions = Vec::with_capacity(rebuilt.vertex_count());
    for v in 0..rebuilt.vertex_count() as u32 {
        new_positions.push(rebuilt.position(v));
    }
    let mut new_triangles = Vec::with_capacity(rebuilt.triangle_count());
    let mut new_tri_face = Vec::with_capacity(rebuilt.triangle_count());
    for t in 0..rebuilt.triangle_count() {
        new_triangles.push(rebuilt.triangle(t));
        let face_idx = if rebuilt.tri_ids.is_empty() { 0 } else { rebuilt.tri_ids[t] };
        new_tri_face.push(to_face_id(face_idx));
    }
    mesh.replace_topology(new_positions, new_triangles, new_tri_face);
    Ok(before.saturating_sub(mesh.triangle_count()))
}

fn jittered_centroid(centroid: Point3d, axis: usize) -> Point3d {
    const JITTER: f64 = 1e-7;
    match axis {
        0 => Point3d::new(centroid.x, centroid.y + JITTER, centroid.z + JITTER * 1.3),
        1 => Point3d::new(centroid.x + JITTER * 1.1, centroid.y, centroid.z + JITTER * 0.7),
        _ => Point3d::new(centroid.x + JITTER * 0.9, centroid.y + JITTER * 1.4, centroid.z),
    }
}

fn raycast_vote(mesh: &mut TaggedMesh, cfg: &InternalConfig) -> usize {
    let positions = mesh.positions().to_vec();
    let triangles = mesh.triangles().to_vec();
    let tri_face = mesh.tri_face().to_vec();
    let dirs = [Vec3::X, Vec3::Y, Vec3::Z];

    let mut remove = vec![false; triangles.len()];
    for (t, tri) in triangles.iter().enumerate() {
        let centroid = triangle_centroid(
            positions[tri[0] as usize],
            positions[tri[1] as usize],
            positions[tri[2] as usize],
        );
        let mut inside_votes = 0;
        for (axis, &dir) in dirs.iter().enumerate() {
            let origin = jittered_centroid(centroid, axis);
            let mut crossings = 0;
            for other in &triangles {
                let p0 = positions[other[0] as usize];
                let p1 = positions[other[1] as usize];
                let p2 = positions[other[2] as usize];
                if ray_triangle_intersect(origin, dir, p0, p1, p2, cfg.crossing_tolerance).is_some() {
                    crossings += 1;
                }
            }
            if crossings % 2 == 1 {
                inside_votes += 1;
            }
        }
        if inside_votes >= 2 {
            remove[t] = true;
        }
    }

    finish_removal(mesh, positions, triangles, tri_face, remove)
}

fn winding_number_classify(mesh: &mut TaggedMesh, cfg: &InternalConfig) -> usize {
    let positions = mesh.positions().to_vec();
    let triangles = mesh.triangles().to_vec();
    let tri_face = mesh.tri_face().to_vec();

    let mut remove = vec![false; triangles.len()];
    for (t, tri) in triangles.iter().enumerate() {
        let p0 = positions[tri[0] as usize];
        let p1 = positions[tri[1] as usize];
        let p2 = positions[tri[2] as usize];
        let Some(normal) = triangle_normal(p0, p1, p2) else {
            continue;
        };
        let centroid = triangle_centroid(p0, p1, p2);
        let offset = normal * cfg.offset_scale;
        let w_minus = winding_number(centroid - offset, &positions, &triangles);
        let w_plus = winding_number(centroid + offset, &positions, &triangles);
        let crosses_half = (w_minus - 0.5) * (w_plus - 0.5) < 0.0;
        if !crosses_half {
            // Both sides agree: interior (~1) or exterior (~0).
            let is_interior = (w_minus + w_plus) * 0.5 > 0.5;
            if is_interior {
                remove[t] = true;
            }
        }
    }

    finish_removal(mesh, positions, triangles, tri_face, remove)
}

fn winding_number(p: Point3d, positions: &[Point3d], triangles: &[[u32; 3]]) -> f64 {
    let mut sum = 0.0;
    for tri in triangles {
        let a = positions[tri[0] as usize];
        let b = positions[tri[1] as usize];
        let c = positions[tri[2] as usize];
        sum += solid_angle(p, a, b, c);
    }
    sum / (4.0 * std::f64::consts::PI)
}

fn finish_removal(
    mesh: &mut TaggedMesh,
    positions: Vec<Point3d>,
    triangles: Vec<[u32; 3]>,
    tri_face: Vec<mesh_types::FaceId>,
    remove: Vec<bool>,
) -> usize {
    let removed = remove.iter().filter(|&&r| r).count();
    if removed == 0 {
        return 0;
    }
    let mut kept_triangles = Vec::with_capacity(triangles.len() - removed);
    let mut kept_faces = Vec::with_capacity(triangles.len() - removed);
    for (t, tri) in triangles.iter().enumerate() {
        if !remove[t] {
            kept_triangles.push(*tri);
            kept_faces.push(tri_face[t]);
        }
    }
    mesh.replace_topology(positions, kept_triangles, kept_faces);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::MockManifoldEngine;

    fn unit_triangle(mesh: &mut TaggedMesh) {
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn manifold_strategy_adopts_engine_result() {
        let mut mesh = TaggedMesh::new();
        unit_triangle(&mut mesh);
        let mut engine = MockManifoldEngine::new();
        let cfg = InternalConfig::default();
        let result = remove_internal_triangles(&mut mesh, &cfg, &mut engine);
        assert!(result.is_ok());
    }

    #[test]
    fn raycast_vote_leaves_single_shell_untouched() {
        let mut mesh = TaggedMesh::new();
        unit_triangle(&mut mesh);
        let cfg = InternalConfig {
            strategy: InternalStrategy::RaycastVote,
            ..InternalConfig::default()
        };
        let mut engine = MockManifoldEngine::new();
        let removed = remove_internal_triangles(&mut mesh, &cfg, &mut engine).unwrap();
        assert_eq!(removed, 0);
    }
}

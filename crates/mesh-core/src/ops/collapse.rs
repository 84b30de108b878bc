//! §4.3.5 Collapse Tiny Triangles.

use mesh_types::{MeshError, Point3d};

use crate::external::{raw_from_tagged_mesh, to_face_id};
use crate::geom::{shortest_edge_length, Aabb, UnionFind};
use crate::manifold::ManifoldEngine;
use crate::mesh::TaggedMesh;

#[derive(Debug, Clone, Copy)]
pub struct CollapseConfig {
    pub length_threshold: f64,
    /// Safety margin the cleanup's intersecting bounding box is inflated
    /// by, so the boolean engine never clips exactly on the mesh surface.
    pub safety_margin: f64,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            length_threshold: 1e-4,
            safety_margin: 1e-3,
        }
    }
}

/// Union-find the endpoints of every triangle whose shortest edge is below
/// `length_threshold` (lower index wins), move non-representatives onto
/// their root, then clean up the resulting degenerate triangles by
/// intersecting with an inflated bounding box through `engine` and
/// adopting the result.
pub fn collapse_tiny_triangles(
    mesh: &mut TaggedMesh,
    cfg: &CollapseConfig,
    engine: &mut dyn ManifoldEngine,
) -> Result<usize, MeshError> {
    let positions = mesh.positions().to_vec();
    let triangles = mesh.triangles().to_vec();

    let mut uf = UnionFind::new(positions.len());
    let mut any_collapsed = false;
    for tri in &triangles {
        let [a, b, c] = *tri;
        let p0 = positions[a as usize];
        let p1 = positions[b as usize];
        let p2 = positions[c as usize];
        if shortest_edge_length(p0, p1, p2) < cfg.length_threshold {
            uf.union(a, b);
            uf.union(b, c);
            any_collapsed = true;
        }
    }

    if !any_collapsed {
        return Ok(0);
    }

    let remapped: Vec<[u32; 3]> = triangles
        .iter()
        .map(|tri| tri.map(|v| uf.find(v)))
        .collect();

    let mut working = TaggedMesh::new();
    working.weld_tolerance = mesh.weld_tolerance;
    for (tri, &face) in remapped.iter().zip(mesh.tri_face().iter()) {
        let name = mesh.face_name().name_of(face).unwrap_or("").to_string();
        let p0 = positions[tri[0] as usize];
        let p1 = positions[tri[1] as usize];
        let p2 = positions[tri[2] as usize];
        working.add_triangle(&name, p0, p1, p2);
    }

    let aabb = Aabb::of_points(&positions).inflated(cfg.safety_margin);
    let box_mesh = aabb_mesh(&aabb);

    let (working_raw, _) = raw_from_tagged_mesh(&working);
    let working_handle = engine
        .build(&working_raw)
        .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
    let box_handle = engine
        .build(&box_mesh)
        .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
    let result_handle = engine
        .intersect(working_handle, box_handle)
        .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
    let cleaned = engine
        .get_mesh(result_handle)
        .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
    engine.delete(working_handle);
    engine.delete(box_handle);
    engine.delete(result_handle);

    let before = mesh.triangle_count();
    let mut new_positions = Vec::with_capacity(cleaned.vertex_count());
    for v in 0..cleaned.vertex_count() as u32 {
        new_positions.push(cleaned.position(v));
    }
    let mut new_triangles = Vec::with_capacity(cleaned.triangle_count());
    let mut new_tri_face = Vec::with_capacity(cleaned.triangle_count());
    for t in 0..cleaned.triangle_count() {
        new_triangles.push(cleaned.triangle(t));
        let face_idx = if cleaned.tri_ids.is_empty() { 0 } else { cleaned.tri_ids[t] };
        new_tri_face.push(to_face_id(face_idx));
    }
    mesh.replace_topology(new_positions, new_triangles, new_tri_face);
    mesh.compact_vertices();

    Ok(before.saturating_sub(mesh.triangle_count()).max(if any_collapsed { 1 } else { 0 }))
}

/// Two triangles per face of an axis-aligned box, tagged with a single
/// sentinel face-id distinct from any real mesh face (the cleanup only
/// cares about the geometric intersection, not the box's own labeling).
fn aabb_mesh(aabb: &Aabb) -> crate::external::RawMesh {
    let min = aabb.min;
    let max = aabb.max;
    let corners = [
        Point3d::new(min.x, min.y, min.z),
        Point3d::new(max.x, min.y, min.z),
        Point3d::new(max.x, max.y, min.z),
        Point3d::new(min.x, max.y, min.z),
        Point3d::new(min.x, min.y, max.z),
        Point3d::new(max.x, min.y, max.z),
        Point3d::new(max.x, max.y, max.z),
        Point3d::new(min.x, max.y, max.z),
    ];
    const FACES: [[u32; 4]; 6] = [
        [0, 1, 2, 3],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [1, 2, 6, 5],
        [2, 3, 7, 6],
        [3, 0, 4, 7],
    ];
    let mut vert_properties = Vec::with_capacity(24);
    for c in &corners {
        vert_properties.push(c.x as f32);
        vert_properties.push(c.y as f32);
        vert_properties.push(c.z as f32);
    }
    let mut tri_verts = Vec::with_capacity(36);
    for quad in &FACES {
        tri_verts.extend_from_slice(&[quad[0], quad[1], quad[2]]);
        tri_verts.extend_from_slice(&[quad[0], quad[2], quad[3]]);
    }
    let tri_ids = vec![u32::MAX; 12];
    crate::external::RawMesh {
        vert_properties,
        tri_verts,
        tri_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::MockManifoldEngine;
    use mesh_types::Point3d;

    #[test]
    fn collapses_sliver_triangle_without_panicking() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle(
            "a",
            Point3d::ORIGIN,
            Point3d::new(1e-6, 0.0, 0.0),
            Point3d::new(0.0, 1e-6, 0.0),
        );
        mesh.add_triangle("a", Point3d::new(1e-6, 0.0, 0.0), Point3d::new(1.0, 1.0, 0.0), Point3d::new(0.0, 1e-6, 0.0));
        let mut engine = MockManifoldEngine::new();
        let cfg = CollapseConfig::default();
        let result = collapse_tiny_triangles(&mut mesh, &cfg, &mut engine);
        assert!(result.is_ok());
    }

    #[test]
    fn no_op_when_no_triangle_is_tiny() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let mut engine = MockManifoldEngine::new();
        let changed = collapse_tiny_triangles(&mut mesh, &CollapseConfig::default(), &mut engine).unwrap();
        assert_eq!(changed, 0);
    }
}

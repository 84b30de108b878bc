//! §4.3.2 Remove Opposite Single-Edge Faces.

use std::collections::{HashMap, HashSet};

use mesh_types::{FaceId, Vec3};

use crate::geom::triangle_normal_unnormalized;
use crate::mesh::TaggedMesh;
use crate::topology::TopologyIndex;

#[derive(Debug, Clone, Copy)]
pub struct OppositeFaceConfig {
    pub normal_dot_threshold: f64,
}

impl Default for OppositeFaceConfig {
    fn default() -> Self {
        Self { normal_dot_threshold: -0.95 }
    }
}

fn area_weighted_normal(mesh: &TaggedMesh, tris: &[mesh_types::TriIdx]) -> Option<Vec3> {
    let positions = mesh.positions();
    let triangles = mesh.triangles();
    let mut sum = Vec3::ZERO;
    for &t in tris {
        let [a, b, c] = triangles[t.index()];
        sum = sum + triangle_normal_unnormalized(positions[a as usize], positions[b as usize], positions[c as usize]);
    }
    sum.normalized()
}

/// For each face pair sharing exactly one connected boundary chain, if the
/// two faces' area-weighted normals are nearly anti-parallel (dot ≤
/// `cfg.normal_dot_threshold`), remove whichever of the two faces
/// participates in only that single pair (i.e. has no other neighbor).
pub fn remove_opposite_single_edge_faces(mesh: &mut TaggedMesh, cfg: &OppositeFaceConfig) -> usize {
    let topo = TopologyIndex::build(mesh);

    let mut single_pair_partner: HashMap<FaceId, FaceId> = HashMap::new();
    for (&face, neighbors) in &topo.face_adj {
        if neighbors.len() == 1 {
            single_pair_partner.insert(face, *neighbors.iter().next().unwrap());
        }
    }

    let mut faces_to_remove: HashSet<FaceId> = HashSet::new();
    for (&face, &partner) in &single_pair_partner {
        if faces_to_remove.contains(&face) {
            continue;
        }
        match topo.chains_between(face, partner) {
            Some(c) if c.len() == 1 => {}
            _ => continue,
        }
        let normal_a = match topo.face_tris.get(&face).and_then(|t| area_weighted_normal(mesh, t)) {
            Some(n) => n,
            None => continue,
        };
        let normal_b = match topo.face_tris.get(&partner).and_then(|t| area_weighted_normal(mesh, t)) {
            Some(n) => n,
            None => continue,
        };
        if normal_a.dot(&normal_b) <= cfg.normal_dot_threshold {
            faces_to_remove.insert(face);
        }
    }

    if faces_to_remove.is_empty() {
        return 0;
    }

    let positions = mesh.positions().to_vec();
    let triangles = mesh.triangles().to_vec();
    let tri_face = mesh.tri_face().to_vec();
    let mut kept_triangles = Vec::new();
    let mut kept_faces = Vec::new();
    let mut removed = 0;
    for (tri, face) in triangles.iter().zip(tri_face.iter()) {
        if faces_to_remove.contains(face) {
            removed += 1;
            continue;
        }
        kept_triangles.push(*tri);
        kept_faces.push(*face);
    }

    if removed > 0 {
        mesh.replace_topology(positions, kept_triangles, kept_faces);
        mesh.compact_vertices();
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    #[test]
    fn removes_face_with_flipped_neighbor() {
        let mut mesh = TaggedMesh::new();
        // Two triangles sharing an edge, with opposite winding (normals
        // point away from each other).
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        mesh.add_triangle("b", Point3d::new(1.0, 0.0, 0.0), Point3d::ORIGIN, Point3d::new(0.0, -1.0, 0.0));
        let cfg = OppositeFaceConfig::default();
        let removed = remove_opposite_single_edge_faces(&mut mesh, &cfg);
        assert_eq!(removed, 1);
    }

    #[test]
    fn leaves_non_opposite_faces_untouched() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        mesh.add_triangle("b", Point3d::new(1.0, 0.0, 0.0), Point3d::new(1.0, 1.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let removed = remove_opposite_single_edge_faces(&mut mesh, &OppositeFaceConfig::default());
        assert_eq!(removed, 0);
    }
}

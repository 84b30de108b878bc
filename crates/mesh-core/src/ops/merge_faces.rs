//! §4.3.9 Merge Tiny Faces.

use std::collections::HashMap;

use mesh_types::FaceId;

use crate::geom::triangle_area;
use crate::mesh::TaggedMesh;
use crate::topology::TopologyIndex;

#[derive(Debug, Clone, Copy)]
pub struct MergeFacesConfig {
    pub max_area: f64,
}

impl Default for MergeFacesConfig {
    fn default() -> Self {
        Self { max_area: 1e-3 }
    }
}

fn face_area(mesh: &TaggedMesh, topo: &TopologyIndex, face: FaceId) -> f64 {
    let positions = mesh.positions();
    let triangles = mesh.triangles();
    topo.face_tris
        .get(&face)
        .map(|tris| {
            tris.iter()
                .map(|&t| {
                    let [a, b, c] = triangles[t.index()];
                    triangle_area(positions[a as usize], positions[b as usize], positions[c as usize])
                })
                .sum()
        })
        .unwrap_or(0.0)
}

/// For each face whose total area is below `max_area`, rename all its
/// triangles to its largest-area topological neighbor's face-id.
pub fn merge_tiny_faces(mesh: &mut TaggedMesh, cfg: &MergeFacesConfig) -> usize {
    let topo = TopologyIndex::build(mesh);
    let areas: HashMap<FaceId, f64> = topo.face_tris.keys().map(|&f| (f, face_area(mesh, &topo, f))).collect();

    let mut rename: HashMap<FaceId, FaceId> = HashMap::new();
    for (&face, &area) in &areas {
        if area >= cfg.max_area {
            continue;
        }
        let Some(neighbors) = topo.face_adj.get(&face) else {
            continue;
        };
        let best = neighbors.iter().max_by(|a, b| {
            areas.get(a).copied().unwrap_or(0.0).partial_cmp(&areas.get(b).copied().unwrap_or(0.0)).unwrap()
        });
        if let Some(&target) = best {
            rename.insert(face, target);
        }
    }

    if rename.is_empty() {
        return 0;
    }

    let mut changed = 0;
    let positions = mesh.positions().to_vec();
    let triangles = mesh.triangles().to_vec();
    let mut tri_face = mesh.tri_face().to_vec();
    for face in tri_face.iter_mut() {
        if let Some(&target) = rename.get(face) {
            *face = target;
            changed += 1;
        }
    }
    mesh.replace_topology(positions, triangles, tri_face);
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    #[test]
    fn merges_tiny_face_into_larger_neighbor() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle(
            "big",
            Point3d::ORIGIN,
            Point3d::new(10.0, 0.0, 0.0),
            Point3d::new(0.0, 10.0, 0.0),
        );
        mesh.add_triangle(
            "tiny",
            Point3d::new(10.0, 0.0, 0.0),
            Point3d::new(10.01, 0.0, 0.0),
            Point3d::new(0.0, 10.0, 0.0),
        );
        let cfg = MergeFacesConfig { max_area: 1.0 };
        let changed = merge_tiny_faces(&mut mesh, &cfg);
        assert_eq!(changed, 1);
        assert_eq!(mesh.tri_face()[0], mesh.tri_face()[1]);
    }

    #[test]
    fn leaves_faces_above_threshold_alone() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(10.0, 0.0, 0.0), Point3d::new(0.0, 10.0, 0.0));
        let changed = merge_tiny_faces(&mut mesh, &MergeFacesConfig { max_area: 1.0 });
        assert_eq!(changed, 0);
    }
}

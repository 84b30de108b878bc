//! Neutral-Fiber Offsetter (§4.5). Treats the classifier's `include_set` as
//! a single sub-mesh and offsets every touched vertex along its
//! area-weighted average normal by `k * thickness`.

use std::collections::{HashMap, HashSet};

use mesh_core::geom::triangle_normal_unnormalized;
use mesh_core::TaggedMesh;
use mesh_types::{FaceId, VertIdx, Vec3};
use tracing::warn;

/// Offset every vertex touched by `include_set`'s triangles by
/// `-(k * thickness)` along its area-weighted averaged normal. Vertices
/// untouched by the sub-mesh are left unchanged.
///
/// Averaging rather than per-face offset keeps the sub-mesh's triangle
/// connectivity intact across creases, so the unfolder still sees one
/// island per connected component (§4.5 "Why averaged"). When the
/// sub-mesh itself has more than one connected component this is always a
/// data error — it produces floating islands downstream — so a warning is
/// emitted, but the offset still proceeds per component rather than
/// refusing outright.
pub fn offset_neutral_fiber(mesh: &mut TaggedMesh, include_set: &HashSet<FaceId>, k: f64, thickness: f64) {
    let sub_tris: Vec<usize> = mesh
        .tri_face()
        .iter()
        .enumerate()
        .filter(|(_, face)| include_set.contains(face))
        .map(|(t, _)| t)
        .collect();
    if sub_tris.is_empty() {
        return;
    }

    let component_count = count_connected_components(mesh, &sub_tris);
    if component_count > 1 {
        warn!(
            components = component_count,
            "neutral-fiber sub-mesh has more than one connected component; flat pattern will show floating islands"
        );
    }

    let mut accum: HashMap<u32, Vec3> = HashMap::new();
    for &t in &sub_tris {
        let tri = mesh.triangles()[t];
        let p = [mesh.positions()[tri[0] as usize], mesh.positions()[tri[1] as usize], mesh.positions()[tri[2] as usize]];
        let weighted_normal = triangle_normal_unnormalized(p[0], p[1], p[2]);
        for &v in &tri {
            let entry = accum.entry(v).or_insert(Vec3::ZERO);
            *entry = *entry + weighted_normal;
        }
    }

    let offsets: Vec<(u32, Vec3)> = accum
        .into_iter()
        .filter_map(|(v, sum)| sum.normalized().map(|n| (v, -(k * thickness) * n)))
        .collect();

    let positions = mesh.positions_mut();
    for (v, delta) in offsets {
        positions[v as usize] = positions[v as usize] + delta;
    }
    mesh.touch();
}

/// Connected-component count of the sub-mesh induced by `tris`, using
/// shared-edge adjacency restricted to those triangles (not the full
/// mesh's topology index, since the sub-mesh may not span whole faces'
/// worth of manifold edges).
fn count_connected_components(mesh: &TaggedMesh, tris: &[usize]) -> usize {
    let mut edge_owners: HashMap<(VertIdx, VertIdx), Vec<usize>> = HashMap::new();
    for &t in tris {
        let tri = mesh.triangles()[t];
        for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = if a <= b { (VertIdx(a), VertIdx(b)) } else { (VertIdx(b), VertIdx(a)) };
            edge_owners.entry(key).or_default().push(t);
        }
    }
    let mut adj: HashMap<usize, Vec<usize>> = HashMap::new();
    for owners in edge_owners.values() {
        if owners.len() == 2 {
            adj.entry(owners[0]).or_default().push(owners[1]);
            adj.entry(owners[1]).or_default().push(owners[0]);
        }
    }
    let mut visited = HashSet::new();
    let mut components = 0;
    for &start in tris {
        if visited.contains(&start) {
            continue;
        }
        components += 1;
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(t) = stack.pop() {
            if let Some(neighbors) = adj.get(&t) {
                for &n in neighbors {
                    if visited.insert(n) {
                        stack.push(n);
                    }
                }
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::TaggedMesh;
    use mesh_types::Point3d;

    #[test]
    fn offsets_vertex_along_averaged_normal() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let face = mesh.face_name().id_of("a").unwrap();
        let include = HashSet::from([face]);
        offset_neutral_fiber(&mut mesh, &include, 0.5, 2.0);
        for p in mesh.positions() {
            assert!((p.z - (-1.0)).abs() < 1e-9, "expected offset of -k*thickness = -1.0 along +Z normal, got {p:?}");
        }
    }

    #[test]
    fn untouched_vertices_are_unchanged() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        mesh.add_triangle("b", Point3d::new(5.0, 5.0, 5.0), Point3d::new(6.0, 5.0, 5.0), Point3d::new(5.0, 6.0, 5.0));
        let face_a = mesh.face_name().id_of("a").unwrap();
        let include = HashSet::from([face_a]);
        offset_neutral_fiber(&mut mesh, &include, 0.5, 2.0);
        let untouched = mesh.positions()[3];
        assert_eq!(untouched, Point3d::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn two_components_still_offsets_each() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        mesh.add_triangle(
            "a",
            Point3d::new(10.0, 0.0, 0.0),
            Point3d::new(11.0, 0.0, 0.0),
            Point3d::new(10.0, 1.0, 0.0),
        );
        let face = mesh.face_name().id_of("a").unwrap();
        let include = HashSet::from([face]);
        offset_neutral_fiber(&mut mesh, &include, 0.5, 2.0);
        for p in mesh.positions() {
            assert!((p.z + 1.0).abs() < 1e-9);
        }
    }
}

//! Placement BFS, component layout, and output assembly (§4.6 steps 3-6).

use std::collections::{HashMap, HashSet, VecDeque};

use mesh_core::topology::TopologyIndex;
use mesh_core::TaggedMesh;
use mesh_types::{FaceId, Point2d, VertIdx, Vec2};

use crate::types::{FlatFace, FlatPattern, Placement, PlacementStep};

fn chain_endpoints(chain: &[VertIdx]) -> Option<(VertIdx, VertIdx)> {
    if chain.len() < 2 {
        return None;
    }
    if chain.first() == chain.last() {
        // Closed loop: use the two vertices farthest apart by position in
        // the chain as a stable, order-independent pair of anchors.
        let mid = chain.len() / 2;
        Some((chain[0], chain[mid]))
    } else {
        Some((chain[0], *chain.last().unwrap()))
    }
}

/// Pick the shared boundary chain with the most vertices (ties broken by
/// the lower face-adjacency chain index, for determinism).
fn longest_shared_chain<'a>(topo: &'a TopologyIndex, a: FaceId, b: FaceId) -> Option<&'a Vec<VertIdx>> {
    topo.chains_between(a, b)?.iter().max_by_key(|c| c.len())
}

fn dominant_sign(points: &[Point2d], edge_a: Point2d, edge_b: Point2d) -> f64 {
    let edge = Vec2::new(edge_b.x - edge_a.x, edge_b.y - edge_a.y);
    let mut best_abs = 0.0_f64;
    let mut best_sign = 0.0_f64;
    for &p in points {
        let rel = Vec2::new(p.x - edge_a.x, p.y - edge_a.y);
        let cross = edge.cross_z(&rel);
        if cross.abs() > best_abs {
            best_abs = cross.abs();
            best_sign = cross.signum();
        }
    }
    best_sign
}

/// Fit the rigid transform (optionally reflected across the face's own
/// local x-axis first) that carries `(b0_local, b1_local)` onto
/// `(a0_global, a1_global)` (§4.6 step 4).
fn fit_rigid(b0: Point2d, b1: Point2d, a0: Point2d, a1: Point2d, reflect: bool) -> Placement {
    let (b0, b1) = if reflect {
        (Point2d::new(b0.x, -b0.y), Point2d::new(b1.x, -b1.y))
    } else {
        (b0, b1)
    };
    let angle_g = (b1.y - b0.y).atan2(b1.x - b0.x);
    let angle_a = (a1.y - a0.y).atan2(a1.x - a0.x);
    let theta = angle_a - angle_g;
    let (sin, cos) = theta.sin_cos();
    let tx = a0.x - (cos * b0.x - sin * b0.y);
    let ty = a0.y - (sin * b0.x + cos * b0.y);
    Placement::new(cos, sin, tx, ty, reflect)
}

/// Place every flat face onto a shared layout plane by BFS over face
/// adjacency, fitting each newly-visited face onto its already-placed
/// neighbor through their longest shared boundary chain, then laying
/// connected components left-to-right (§4.6 steps 3-6).
///
/// Returns the per-face placement, the list of connected components (in
/// placement order), and whether more than one component was produced.
pub fn place_faces(
    topo: &TopologyIndex,
    flat_faces: &HashMap<FaceId, FlatFace>,
    thickness: f64,
    record_steps: bool,
) -> (HashMap<FaceId, Placement>, bool, Option<Vec<PlacementStep>>) {
    let mut placements: HashMap<FaceId, Placement> = HashMap::new();
    let mut unplaced: HashSet<FaceId> = flat_faces.keys().copied().collect();
    let mut component_count = 0;
    let mut steps = Vec::new();
    let mut components: Vec<Vec<FaceId>> = Vec::new();

    while !unplaced.is_empty() {
        let root = *unplaced
            .iter()
            .max_by(|&&a, &&b| flat_faces[&a].area.partial_cmp(&flat_faces[&b].area).unwrap())
            .unwrap();
        component_count += 1;

        placements.insert(root, Placement::identity());
        unplaced.remove(&root);
        steps.push(PlacementStep {
            face: root,
            placement: Placement::identity(),
        });

        let mut component = vec![root];
        let mut queue = VecDeque::from([root]);
        while let Some(f) = queue.pop_front() {
            let mut neighbors: Vec<FaceId> = topo
                .face_adj
                .get(&f)
                .map(|set| set.iter().copied().filter(|g| unplaced.contains(g)).collect())
                .unwrap_or_default();
            neighbors.sort_by_key(|g| g.0);

            for g in neighbors {
                if !unplaced.contains(&g) {
                    continue;
                }
                let Some(chain) = longest_shared_chain(topo, f, g) else { continue };
                let Some((v0, v1)) = chain_endpoints(chain) else { continue };
                let (Some(f_flat), Some(g_flat)) = (flat_faces.get(&f), flat_faces.get(&g)) else {
                    continue;
                };
                let (Some(f_local0), Some(f_local1), Some(g_local0), Some(g_local1)) =
                    (f_flat.local(v0), f_flat.local(v1), g_flat.local(v0), g_flat.local(v1))
                else {
                    continue;
                };
                let f_placement = placements[&f];
                let global_a0 = f_placement.apply(f_local0);
                let global_a1 = f_placement.apply(f_local1);
                if global_a0.distance_to(&global_a1) < 1e-12 {
                    continue;
                }

                let f_points_global: Vec<Point2d> =
                    f_flat.coords.values().map(|&p| f_placement.apply(p)).collect();
                let g_points_local: Vec<Point2d> = g_flat.coords.values().copied().collect();
                let sign_f = dominant_sign(&f_points_global, global_a0, global_a1);
                let sign_g = dominant_sign(&g_points_local, g_local0, g_local1);
                let reflect = sign_f != 0.0 && sign_g != 0.0 && sign_f == sign_g;

                let placement = fit_rigid(g_local0, g_local1, global_a0, global_a1, reflect);
                placements.insert(g, placement);
                unplaced.remove(&g);
                component.push(g);
                queue.push_back(g);
                if record_steps {
                    steps.push(PlacementStep { face: g, placement });
                }
            }
        }
        components.push(component);
    }

    layout_components(flat_faces, &mut placements, &components, thickness);

    let disconnected = component_count > 1;
    (placements, disconnected, if record_steps { Some(steps) } else { None })
}

/// Lay connected components left-to-right with a margin of
/// `max(1, 2*thickness)` between bounding boxes (§4.6 step 6).
fn layout_components(
    flat_faces: &HashMap<FaceId, FlatFace>,
    placements: &mut HashMap<FaceId, Placement>,
    components: &[Vec<FaceId>],
    thickness: f64,
) {
    let margin = (1.0_f64).max(2.0 * thickness);
    let mut cursor_x = 0.0;
    for component in components {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        for &face in component {
            let flat = &flat_faces[&face];
            let placement = placements[&face];
            for &local in flat.coords.values() {
                let p = placement.apply(local);
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
            }
        }
        if !min_x.is_finite() {
            continue;
        }
        let dx = cursor_x - min_x;
        let dy = -min_y;
        for &face in component {
            let updated = placements[&face].translated(dx, dy);
            placements.insert(face, updated);
        }
        cursor_x += (max_x - min_x) + margin;
    }
}

/// Assemble the final `FlatPattern`: apply each face's placement, weld
/// vertices at the quantization lattice `max(1e-5, thickness*1e-6)`, and
/// flatten triangles/uvs/tri_face (§4.6 step 6, §6 output).
pub fn assemble_flat_pattern(
    mesh: &TaggedMesh,
    topo: &TopologyIndex,
    flat_faces: &HashMap<FaceId, FlatFace>,
    placements: &HashMap<FaceId, Placement>,
    thickness: f64,
    disconnected: bool,
    debug_steps: Option<Vec<PlacementStep>>,
) -> FlatPattern {
    let tau = (1e-5_f64).max(thickness * 1e-6);
    let quantize = |p: Point2d| -> (i64, i64) { ((p.x / tau).round() as i64, (p.y / tau).round() as i64) };

    let mut vertex_of: HashMap<(i64, i64), u32> = HashMap::new();
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut triangles = Vec::new();
    let mut tri_face = Vec::new();

    let mut faces: Vec<FaceId> = flat_faces.keys().copied().collect();
    faces.sort_by_key(|f| f.0);

    for face in faces {
        let flat = &flat_faces[&face];
        let Some(placement) = placements.get(&face) else { continue };
        let Some(tris) = topo.face_tris.get(&face) else { continue };
        for &t in tris {
            let tri = mesh.triangles()[t.index()];
            let mut out = [0u32; 3];
            for (i, &v) in tri.iter().enumerate() {
                let Some(local) = flat.local(VertIdx(v)) else { continue };
                let global = placement.apply(local);
                let key = quantize(global);
                let idx = *vertex_of.entry(key).or_insert_with(|| {
                    let idx = positions.len() as u32;
                    positions.push([global.x as f32, global.y as f32, 0.0]);
                    uvs.push([global.x as f32, global.y as f32]);
                    idx
                });
                out[i] = idx;
            }
            triangles.push(out);
            tri_face.push(face.0);
        }
    }

    FlatPattern {
        positions,
        triangles,
        tri_face,
        uvs,
        thickness,
        bend_annotations: Default::default(),
        disconnected,
        debug_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::TaggedMesh;
    use mesh_types::Point3d;
    use std::collections::HashMap as StdHashMap;

    #[test]
    fn shared_edge_lines_up_adjacent_faces() {
        let mut mesh = TaggedMesh::new();
        let p00 = Point3d::new(0.0, 0.0, 0.0);
        let p10 = Point3d::new(1.0, 0.0, 0.0);
        let p01 = Point3d::new(0.0, 1.0, 0.0);
        let p11 = Point3d::new(1.0, 1.0, 0.0);
        mesh.add_triangle("left", p00, p10, p01);
        mesh.add_triangle("right", p10, p11, p01);
        let topo = TopologyIndex::build(&mesh);

        let left = mesh.face_name().id_of("left").unwrap();
        let right = mesh.face_name().id_of("right").unwrap();
        let flat_left = crate::unfold::param::parametrize_planar(&mesh, &topo, left).unwrap();
        let flat_right = crate::unfold::param::parametrize_planar(&mesh, &topo, right).unwrap();
        let mut flat_faces = StdHashMap::new();
        flat_faces.insert(left, flat_left);
        flat_faces.insert(right, flat_right);

        let (placements, disconnected, _) = place_faces(&topo, &flat_faces, 0.0, false);
        assert!(!disconnected);
        assert_eq!(placements.len(), 2);
    }
}

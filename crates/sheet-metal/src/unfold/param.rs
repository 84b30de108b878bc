//! Per-face parametrization (§4.6 step 1-2): planar faces project onto their
//! own plane; cylindrical faces unroll around their axis with a BFS
//! angle-unwrap so multi-valued `atan2` doesn't tear the strip.

use std::collections::{HashMap, HashSet, VecDeque};

use mesh_core::geom::{triangle_area, triangle_centroid, triangle_normal_unnormalized};
use mesh_core::topology::{trace_chains, TopologyIndex};
use mesh_core::TaggedMesh;
use mesh_types::{FaceId, FaceKind, FaceMeta, Point2d, Point3d, VertIdx, Vec3};

use crate::types::{FlatFace, Frame};

fn face_vertices(mesh: &TaggedMesh, topo: &TopologyIndex, face: FaceId) -> Vec<VertIdx> {
    let mut seen = HashSet::new();
    let mut verts = Vec::new();
    if let Some(tris) = topo.face_tris.get(&face) {
        for &t in tris {
            for &v in &mesh.triangles()[t.index()] {
                if seen.insert(v) {
                    verts.push(VertIdx(v));
                }
            }
        }
    }
    verts
}

/// Boundary edges of `face`'s own triangles: edges that appear exactly once
/// among that face's triangle-edge list (either a true mesh boundary or a
/// seam shared with a different face).
fn face_boundary_edges(mesh: &TaggedMesh, topo: &TopologyIndex, face: FaceId) -> Vec<(VertIdx, VertIdx)> {
    let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
    let Some(tris) = topo.face_tris.get(&face) else {
        return Vec::new();
    };
    for &t in tris {
        let tri = mesh.triangles()[t.index()];
        for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = if a <= b { (a, b) } else { (b, a) };
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n == 1)
        .map(|((a, b), _)| (VertIdx(a), VertIdx(b)))
        .collect()
}

fn boundary_chains(mesh: &TaggedMesh, topo: &TopologyIndex, face: FaceId) -> Vec<Vec<VertIdx>> {
    let edges = face_boundary_edges(mesh, topo, face);
    trace_chains(&edges)
}

/// Longest edge among `face`'s own triangles, used as the planar
/// parametrization's `u` reference direction.
fn longest_face_edge(mesh: &TaggedMesh, topo: &TopologyIndex, face: FaceId) -> Option<(Point3d, Point3d)> {
    let tris = topo.face_tris.get(&face)?;
    let mut best: Option<(f64, Point3d, Point3d)> = None;
    for &t in tris {
        let tri = mesh.triangles()[t.index()];
        for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let pa = mesh.positions()[a as usize];
            let pb = mesh.positions()[b as usize];
            let len = pa.distance_to(&pb);
            if best.as_ref().map(|(l, ..)| len > *l).unwrap_or(true) {
                best = Some((len, pa, pb));
            }
        }
    }
    best.map(|(_, a, b)| (a, b))
}

/// Planar face parametrization (§4.6 step 1): project every vertex onto the
/// face's own plane using `u` = the longest edge direction and `v = n × u`.
pub fn parametrize_planar(mesh: &TaggedMesh, topo: &TopologyIndex, face: FaceId) -> Option<FlatFace> {
    let tris = topo.face_tris.get(&face)?;
    if tris.is_empty() {
        return None;
    }

    let mut normal_sum = Vec3::ZERO;
    let mut area = 0.0;
    let mut centroid_sum = Vec3::ZERO;
    for &t in tris {
        let tri = mesh.triangles()[t.index()];
        let p = [
            mesh.positions()[tri[0] as usize],
            mesh.positions()[tri[1] as usize],
            mesh.positions()[tri[2] as usize],
        ];
        let tri_area = triangle_area(p[0], p[1], p[2]);
        normal_sum = normal_sum + triangle_normal_unnormalized(p[0], p[1], p[2]);
        area += tri_area;
        let c = triangle_centroid(p[0], p[1], p[2]);
        centroid_sum = centroid_sum + c.to_vec3() * tri_area;
    }
    let normal = normal_sum.normalized()?;
    let origin = if area > 1e-15 {
        Point3d::ORIGIN + centroid_sum / area
    } else {
        mesh.positions()[mesh.triangles()[tris[0].index()][0] as usize]
    };

    let u = longest_face_edge(mesh, topo, face)
        .and_then(|(a, b)| {
            let edge = b - a;
            (edge - edge.project_onto(&normal)).normalized()
        })
        .unwrap_or_else(|| normal.arbitrary_perpendicular());
    let v = normal.cross(&u);

    let mut coords = HashMap::new();
    for &v_idx in &face_vertices(mesh, topo, face) {
        let p = mesh.positions()[v_idx.index()];
        let rel = p - origin;
        coords.insert(v_idx, Point2d::new(rel.dot(&u), rel.dot(&v)));
    }

    Some(FlatFace {
        face,
        kind: FaceKind::Planar,
        coords,
        basis_3d: Frame { origin, u, v, normal },
        boundary_chains: boundary_chains(mesh, topo, face),
        area,
    })
}

/// A seed point used to orient the cylindrical unroll's zero-angle
/// reference: the first vertex of a chain shared with a neighboring face
/// when one exists (keeps the seam aligned), otherwise any vertex.
fn reference_seed(mesh: &TaggedMesh, topo: &TopologyIndex, face: FaceId) -> Option<VertIdx> {
    if let Some(neighbors) = topo.face_adj.get(&face) {
        let mut sorted: Vec<FaceId> = neighbors.iter().copied().collect();
        sorted.sort_by_key(|f| f.0);
        for neighbor in sorted {
            if let Some(chains) = topo.chains_between(face, neighbor) {
                if let Some(chain) = chains.iter().find(|c| !c.is_empty()) {
                    return Some(chain[0]);
                }
            }
        }
    }
    face_vertices(mesh, topo, face).into_iter().next()
}

/// Cylindrical face parametrization (§4.6 step 2): unroll around the face's
/// axis, mapping each vertex to `(t, θ·R)` where `t` is the axial coordinate
/// and `θ` is unwrapped by BFS from a seed vertex so the strip doesn't tear
/// across the ±π branch cut.
///
/// `is_inside` picks the neutral radius per the classifier's co-axial
/// grouping: `R + k·thickness` for the inside surface, `R - (1-k)·thickness`
/// for the outside (§4.6 "neutral radius").
pub fn parametrize_cylindrical(
    mesh: &TaggedMesh,
    topo: &TopologyIndex,
    face: FaceId,
    meta: &FaceMeta,
    thickness: f64,
    k: f64,
    is_inside: bool,
) -> Option<FlatFace> {
    let axis = meta.axis?.normalized()?;
    let radius = meta.radius?;
    let o = meta
        .center
        .or_else(|| face_vertices(mesh, topo, face).first().map(|&v| mesh.positions()[v.index()]))?;

    let seed = reference_seed(mesh, topo, face)?;
    let seed_pos = mesh.positions()[seed.index()];
    let axial = (seed_pos - o).dot(&axis);
    let radial_seed = (seed_pos - o) - axis * axial;
    let u_ax = radial_seed.normalized().unwrap_or_else(|| axis.arbitrary_perpendicular());
    let v_ax = axis.cross(&u_ax);

    let neutral_r = if is_inside { radius + k * thickness } else { radius - (1.0 - k) * thickness };

    // Adjacency among this face's own vertices, for the BFS angle-unwrap.
    let mut adj: HashMap<VertIdx, Vec<VertIdx>> = HashMap::new();
    if let Some(tris) = topo.face_tris.get(&face) {
        for &t in tris {
            let tri = mesh.triangles()[t.index()];
            for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                adj.entry(VertIdx(a)).or_default().push(VertIdx(b));
                adj.entry(VertIdx(b)).or_default().push(VertIdx(a));
            }
        }
    }

    let raw_angle = |p: Point3d| -> (f64, f64) {
        let t = (p - o).dot(&axis);
        let proj = o + axis * t;
        let radial = p - proj;
        (t, radial.dot(&v_ax).atan2(radial.dot(&u_ax)))
    };

    let mut unwrapped: HashMap<VertIdx, f64> = HashMap::new();
    let mut t_of: HashMap<VertIdx, f64> = HashMap::new();
    let (seed_t, seed_theta) = raw_angle(seed_pos);
    t_of.insert(seed, seed_t);
    unwrapped.insert(seed, seed_theta);

    let mut queue = VecDeque::from([seed]);
    while let Some(cur) = queue.pop_front() {
        let parent_theta = unwrapped[&cur];
        let Some(neighbors) = adj.get(&cur).cloned() else { continue };
        for n in neighbors {
            if unwrapped.contains_key(&n) {
                continue;
            }
            let p = mesh.positions()[n.index()];
            let (t, raw_theta) = raw_angle(p);
            let k_wrap = ((parent_theta - raw_theta) / std::f64::consts::TAU).round();
            let theta = raw_theta + k_wrap * std::f64::consts::TAU;
            t_of.insert(n, t);
            unwrapped.insert(n, theta);
            queue.push_back(n);
        }
    }
    // Any vertex unreached by the BFS (disconnected within the face, should
    // not occur for a manifold triangle fan) falls back to its raw angle.
    for v in face_vertices(mesh, topo, face) {
        if !unwrapped.contains_key(&v) {
            let p = mesh.positions()[v.index()];
            let (t, theta) = raw_angle(p);
            t_of.insert(v, t);
            unwrapped.insert(v, theta);
        }
    }

    let mut coords = HashMap::new();
    for (&v, &theta) in &unwrapped {
        coords.insert(v, Point2d::new(t_of[&v], theta * neutral_r));
    }

    Some(FlatFace {
        face,
        kind: FaceKind::Cylindrical,
        coords,
        basis_3d: Frame {
            origin: o,
            u: u_ax,
            v: v_ax,
            normal: axis,
        },
        boundary_chains: boundary_chains(mesh, topo, face),
        area: topo
            .face_tris
            .get(&face)
            .map(|tris| {
                tris.iter()
                    .map(|&t| {
                        let tri = mesh.triangles()[t.index()];
                        triangle_area(
                            mesh.positions()[tri[0] as usize],
                            mesh.positions()[tri[1] as usize],
                            mesh.positions()[tri[2] as usize],
                        )
                    })
                    .sum()
            })
            .unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use mesh_core::TaggedMesh;

    #[test]
    fn planar_parametrization_preserves_area() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle(
            "a",
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(0.0, 3.0, 0.0),
        );
        let face = mesh.face_name().id_of("a").unwrap();
        let topo = TopologyIndex::build(&mesh);
        let flat = parametrize_planar(&mesh, &topo, face).unwrap();
        assert_abs_diff_eq!(flat.area, 3.0, epsilon = 1e-9);
        assert_eq!(flat.coords.len(), 3);
    }

    #[test]
    fn cylindrical_unroll_gives_expected_width_and_height() {
        // Quarter cylinder, radius 5, axial span 4: unrolled size should be
        // (axial extent, angular extent * radius) = (4, (π/2)*5).
        let mut mesh = TaggedMesh::new();
        let r = 5.0;
        let n = 9;
        for i in 0..n {
            let a0 = std::f64::consts::FRAC_PI_2 * (i as f64) / (n as f64 - 1.0);
            let a1 = std::f64::consts::FRAC_PI_2 * (i as f64 + 1.0) / (n as f64 - 1.0);
            if i + 1 >= n {
                break;
            }
            let p00 = Point3d::new(r * a0.cos(), r * a0.sin(), 0.0);
            let p01 = Point3d::new(r * a0.cos(), r * a0.sin(), 4.0);
            let p10 = Point3d::new(r * a1.cos(), r * a1.sin(), 0.0);
            let p11 = Point3d::new(r * a1.cos(), r * a1.sin(), 4.0);
            mesh.add_triangle("cyl", p00, p10, p01);
            mesh.add_triangle("cyl", p10, p11, p01);
        }
        let face = mesh.face_name().id_of("cyl").unwrap();
        mesh.face_meta_mut()
            .insert(face, FaceMeta::cylindrical(Vec3::Z, Point3d::ORIGIN, r));
        let topo = TopologyIndex::build(&mesh);
        let meta = mesh.face_meta()[&face].clone();
        let flat = parametrize_cylindrical(&mesh, &topo, face, &meta, 0.0, 0.5, true).unwrap();

        let xs: Vec<f64> = flat.coords.values().map(|p| p.x).collect();
        let ys: Vec<f64> = flat.coords.values().map(|p| p.y).collect();
        let width = xs.iter().cloned().fold(f64::MIN, f64::max) - xs.iter().cloned().fold(f64::MAX, f64::min);
        let height = ys.iter().cloned().fold(f64::MIN, f64::max) - ys.iter().cloned().fold(f64::MAX, f64::min);
        assert_abs_diff_eq!(width.abs(), 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(height.abs(), std::f64::consts::FRAC_PI_2 * r, epsilon = 1e-6);
    }
}

//! §4.3.6 Self-Intersection Split.
//!
//! Two case-table gaps are deliberately left `SplitCase::Unsupported`: a
//! crossing that lands on an existing vertex (degenerate by definition),
//! and two edge crossings that land too close to their shared apex vertex
//! (the resulting ear triangle would be a sliver). Both are rejected
//! rather than guessed at, per §7's `DegenerateGeometry` recovery rule.

use mesh_types::{FaceId, MeshError, Point3d, Tolerances};

use crate::cancel::CancellationToken;
use crate::geom::{barycentric, clip_segment_to_plane, triangle_area, triangle_normal, Aabb};
use crate::mesh::TaggedMesh;

#[derive(Debug, Clone, Copy)]
pub struct SelfIntersectConfig {
    pub max_iterations: usize,
}

impl Default for SelfIntersectConfig {
    fn default() -> Self {
        Self { max_iterations: 50 }
    }
}

#[derive(Debug, Clone)]
pub enum SplitCase {
    Split(Vec<[Point3d; 3]>),
    Unsupported { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointLocation {
    Vertex(usize),
    Edge(usize),
    Interior,
}

fn classify_point(bary: (f64, f64, f64), tol: f64) -> PointLocation {
    let (u, v, w) = bary;
    if w > 1.0 - tol {
        return PointLocation::Vertex(2);
    }
    if v > 1.0 - tol {
        return PointLocation::Vertex(1);
    }
    if u > 1.0 - tol {
        return PointLocation::Vertex(0);
    }
    if u < tol {
        return PointLocation::Edge(0); // edge (v1, v2), opposite v0
    }
    if v < tol {
        return PointLocation::Edge(1); // edge (v2, v0), opposite v1
    }
    if w < tol {
        return PointLocation::Edge(2); // edge (v0, v1), opposite v2
    }
    PointLocation::Interior
}

fn edge_vertices(tri: &[Point3d; 3], e: usize) -> (Point3d, Point3d, usize, usize) {
    match e {
        0 => (tri[1], tri[2], 1, 2),
        1 => (tri[2], tri[0], 2, 0),
        _ => (tri[0], tri[1], 0, 1),
    }
}

/// Split `tri` at two points `a` and `b` lying on or in it, per the case
/// table in §4.3.6. Returns the replacement sub-triangles, or an
/// `Unsupported` verdict for the two deliberate gaps.
fn split_triangle(tri: &[Point3d; 3], a: Point3d, b: Point3d, tol: &Tolerances) -> SplitCase {
    let bary_a = match barycentric(a, tri[0], tri[1], tri[2]) {
        Some(v) => v,
        None => return SplitCase::Unsupported { reason: "degenerate triangle".to_string() },
    };
    let bary_b = match barycentric(b, tri[0], tri[1], tri[2]) {
        Some(v) => v,
        None => return SplitCase::Unsupported { reason: "degenerate triangle".to_string() },
    };
    let loc_a = classify_point(bary_a, tol.coplanar);
    let loc_b = classify_point(bary_b, tol.coplanar);

    match (loc_a, loc_b) {
        (PointLocation::Vertex(_), _) | (_, PointLocation::Vertex(_)) => SplitCase::Unsupported {
            reason: "crossing coincides with an existing vertex".to_string(),
        },
        (PointLocation::Edge(ea), PointLocation::Edge(eb)) if ea == eb => SplitCase::Unsupported {
            reason: "both crossings on the same edge".to_string(),
        },
        (PointLocation::Edge(ea), PointLocation::Edge(eb)) => split_edge_edge(tri, ea, a, eb, b, tol),
        (PointLocation::Interior, PointLocation::Edge(e)) => split_interior_edge(tri, a, e, b),
        (PointLocation::Edge(e), PointLocation::Interior) => split_interior_edge(tri, b, e, a),
        (PointLocation::Interior, PointLocation::Interior) => split_interior_interior(tri, a, b),
    }
}

/// Two crossings on two different edges of the same triangle. The two
/// edges always share exactly one vertex (the "apex"); cuts off the ear
/// triangle at the apex and splits the remaining quad in two.
fn split_edge_edge(tri: &[Point3d; 3], ea: usize, a: Point3d, eb: usize, b: Point3d, tol: &Tolerances) -> SplitCase {
    let (ea0, ea1, eai0, eai1) = edge_vertices(tri, ea);
    let (_eb0, _eb1, ebi0, ebi1) = edge_vertices(tri, eb);
    let apex_idx = [eai0, eai1].into_iter().find(|i| *i == ebi0 || *i == ebi1);
    let apex_idx = match apex_idx {
        Some(i) => i,
        None => return SplitCase::Unsupported { reason: "edges do not share a vertex".to_string() },
    };
    let apex = tri[apex_idx];
    let far_idx = (0..3).find(|i| *i != eai0 && *i != eai1 && *i != ebi0 && *i != ebi1);
    // On a triangle only one vertex is shared by two distinct edges besides
    // the apex and the two non-apex edge endpoints: the remaining vertex is
    // the one opposite the edge that doesn't touch the apex.
    let opposite = far_idx.map(|i| tri[i]).unwrap_or_else(|| {
        // Every vertex is an endpoint of some edge on a triangle; fall back
        // to whichever of ea's endpoints isn't the apex.
        if ea0 == apex { ea1 } else { ea0 }
    });

    if apex.distance_to(&a) < tol.weld * 10.0 || apex.distance_to(&b) < tol.weld * 10.0 {
        return SplitCase::Unsupported {
            reason: "edge crossing too close to the shared apex vertex".to_string(),
        };
    }

    let near_apex_on_ea = a.distance_to(&ea0) < a.distance_to(&ea1);
    let (pt_near_ea, pt_near_eb) = if near_apex_on_ea { (a, b) } else { (b, a) };

    let ear = [apex, pt_near_ea, pt_near_eb];
    let quad_tri_1 = [pt_near_ea, opposite, pt_near_eb];
    let quad_tri_2 = if near_apex_on_ea { [pt_near_ea, opposite, ea1] } else { [pt_near_eb, opposite, ea1] };
    SplitCase::Split(vec![ear, quad_tri_1, quad_tri_2])
}

/// One crossing strictly interior, the other on edge `e`. Fans the
/// resulting 4-vertex boundary polygon from the interior point.
fn split_interior_edge(tri: &[Point3d; 3], interior: Point3d, e: usize, edge_pt: Point3d) -> SplitCase {
    let (_, _, ei0, ei1) = edge_vertices(tri, e);
    let apex_idx = (0..3).find(|i| *i != ei0 && *i != ei1).unwrap();
    let apex = tri[apex_idx];
    SplitCase::Split(vec![
        [tri[ei0], edge_pt, interior],
        [edge_pt, tri[ei1], interior],
        [tri[ei1], apex, interior],
        [apex, tri[ei0], interior],
    ])
}

/// Both crossings strictly interior: fan triangulate from `a`, then
/// subdivide whichever of the three resulting sub-triangles contains `b`.
fn split_interior_interior(tri: &[Point3d; 3], a: Point3d, b: Point3d) -> SplitCase {
    let fan = [[tri[0], tri[1], a], [tri[1], tri[2], a], [tri[2], tri[0], a]];
    for sub in &fan {
        if let Some((u, v, w)) = barycentric(b, sub[0], sub[1], sub[2]) {
            if u > -1e-9 && v > -1e-9 && w > -1e-9 {
                let mut result: Vec<[Point3d; 3]> = fan.iter().filter(|s| *s != sub).cloned().collect();
                result.push([sub[0], sub[1], b]);
                result.push([sub[1], sub[2], b]);
                result.push([sub[2], sub[0], b]);
                return SplitCase::Split(result);
            }
        }
    }
    SplitCase::Unsupported {
        reason: "second interior crossing did not land in any fan sector".to_string(),
    }
}

fn triangles_share_vertex(a: [u32; 3], b: [u32; 3]) -> bool {
    a.iter().any(|v| b.contains(v))
}

/// Intersection segment of two (non-coplanar) triangles: clip each
/// triangle's edges against the other's plane to get the coplanar overlap
/// segment on the shared line.
fn triangle_pair_overlap(tri_a: &[Point3d; 3], tri_b: &[Point3d; 3], tol: &Tolerances) -> Option<(Point3d, Point3d)> {
    let normal_a = triangle_normal(tri_a[0], tri_a[1], tri_a[2])?;
    let normal_b = triangle_normal(tri_b[0], tri_b[1], tri_b[2])?;
    if normal_a.cross(&normal_b).length() < tol.plane {
        // Nearly coplanar: the dropped-axis 2D edge intersection handler
        // this crate doesn't implement yet (treated as no intersection
        // rather than a false split).
        return None;
    }

    let clip_against = |tri: &[Point3d; 3], plane_point: Point3d, plane_normal: mesh_types::Vec3| {
        let edges = [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])];
        let mut hits = Vec::new();
        for (p0, p1) in edges {
            if let Some((c0, c1)) = clip_segment_to_plane(p0, p1, plane_point, plane_normal) {
                hits.push(c0);
                hits.push(c1);
            }
        }
        hits
    };

    let seg_a = clip_against(tri_a, tri_b[0], normal_b);
    let seg_b = clip_against(tri_b, tri_a[0], normal_a);
    if seg_a.len() < 2 || seg_b.len() < 2 {
        return None;
    }

    // Project both clipped sets onto the shared line direction and take the
    // overlapping interval.
    let line_dir = normal_a.cross(&normal_b).normalized()?;
    let origin = tri_a[0];
    let project = |p: Point3d| (p - origin).dot(&line_dir);
    let (a_min, a_max) = min_max(seg_a.iter().map(|p| project(*p)));
    let (b_min, b_max) = min_max(seg_b.iter().map(|p| project(*p)));
    let lo = a_min.max(b_min);
    let hi = a_max.min(b_max);
    if hi - lo < tol.weld {
        return None;
    }
    Some((origin + line_dir * lo, origin + line_dir * hi))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Sorted-sweep self-intersection split. Builds triangle AABBs, enumerates
/// overlapping non-adjacent pairs, computes each pair's intersection
/// segment, and applies at most one accepted split per outer iteration.
pub fn split_self_intersecting_triangles(
    mesh: &mut TaggedMesh,
    cfg: &SelfIntersectConfig,
    cancel: &CancellationToken,
    tol: &Tolerances,
) -> Result<usize, MeshError> {
    let mut total_splits = 0;
    let growth_cap = (mesh.triangle_count() * 10).max(64);

    for iteration in 0..cfg.max_iterations {
        if cancel.is_cancelled() {
            break;
        }
        if mesh.triangle_count() > growth_cap {
            return Err(MeshError::ExceededBudget {
                operator: "split_self_intersecting_triangles".to_string(),
                iterations: iteration,
            });
        }
        let positions = mesh.positions().to_vec();
        let triangles = mesh.triangles().to_vec();
        let tri_face = mesh.tri_face().to_vec();

        let aabbs: Vec<Aabb> = triangles
            .iter()
            .map(|t| Aabb::of_triangle(positions[t[0] as usize], positions[t[1] as usize], positions[t[2] as usize]))
            .collect();
        let mut order: Vec<usize> = (0..triangles.len()).collect();
        order.sort_by(|&a, &b| aabbs[a].min.x.partial_cmp(&aabbs[b].min.x).unwrap());

        let mut applied = false;
        'sweep: for (i_pos, &i) in order.iter().enumerate() {
            for &j in order.iter().skip(i_pos + 1) {
                if aabbs[j].min.x > aabbs[i].max.x {
                    break;
                }
                if !aabbs[i].overlaps(&aabbs[j]) {
                    continue;
                }
                if triangles_share_vertex(triangles[i], triangles[j]) {
                    continue;
                }
                let tri_i = [
                    positions[triangles[i][0] as usize],
                    positions[triangles[i][1] as usize],
                    positions[triangles[i][2] as usize],
                ];
                let tri_j = [
                    positions[triangles[j][0] as usize],
                    positions[triangles[j][1] as usize],
                    positions[triangles[j][2] as usize],
                ];
                let Some((x, y)) = triangle_pair_overlap(&tri_i, &tri_j, tol) else {
                    continue;
                };

                let case_i = split_triangle(&tri_i, x, y, tol);
                let case_j = split_triangle(&tri_j, x, y, tol);
                let (SplitCase::Split(subs_i), SplitCase::Split(subs_j)) = (case_i, case_j) else {
                    continue;
                };
                if subs_i.iter().chain(subs_j.iter()).any(|s| triangle_area(s[0], s[1], s[2]) <= tol.area) {
                    continue;
                }

                let mut new_positions = positions.clone();
                let mut new_triangles = Vec::with_capacity(triangles.len() + subs_i.len() + subs_j.len());
                let mut new_tri_face = Vec::with_capacity(new_triangles.capacity());
                for (t, (tri, &face)) in triangles.iter().zip(tri_face.iter()).enumerate() {
                    if t == i || t == j {
                        continue;
                    }
                    new_triangles.push(*tri);
                    new_tri_face.push(face);
                }
                let mut push_sub_triangles = |subs: &[[Point3d; 3]], face: FaceId| {
                    for sub in subs {
                        let idx = sub.map(|p| weld_into(&mut new_positions, p, tol.weld));
                        new_triangles.push(idx);
                        new_tri_face.push(face);
                    }
                };
                push_sub_triangles(&subs_i, tri_face[i]);
                push_sub_triangles(&subs_j, tri_face[j]);

                mesh.replace_topology(new_positions, new_triangles, new_tri_face);
                total_splits += 1;
                applied = true;
                break 'sweep;
            }
        }

        if !applied {
            break;
        }
    }

    Ok(total_splits)
}

fn weld_into(positions: &mut Vec<Point3d>, p: Point3d, tol: f64) -> u32 {
    for (idx, existing) in positions.iter().enumerate() {
        if existing.distance_to(&p) <= tol {
            return idx as u32;
        }
    }
    positions.push(p);
    (positions.len() - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_vertex_edge_and_interior() {
        let tol = 1e-6;
        assert_eq!(classify_point((1.0, 0.0, 0.0), tol), PointLocation::Vertex(0));
        assert_eq!(classify_point((0.0, 0.5, 0.5), tol), PointLocation::Edge(0));
        assert_eq!(classify_point((0.34, 0.33, 0.33), tol), PointLocation::Interior);
    }

    #[test]
    fn vertex_crossing_is_unsupported() {
        let tri = [Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0)];
        let tol = Tolerances::default();
        let result = split_triangle(&tri, tri[0], Point3d::new(0.5, 0.25, 0.0), &tol);
        assert!(matches!(result, SplitCase::Unsupported { .. }));
    }

    #[test]
    fn interior_edge_split_produces_four_triangles() {
        let tri = [Point3d::ORIGIN, Point3d::new(2.0, 0.0, 0.0), Point3d::new(0.0, 2.0, 0.0)];
        let interior = Point3d::new(0.5, 0.5, 0.0);
        let edge_pt = Point3d::new(1.0, 1.0, 0.0); // midpoint of edge (v1, v2)
        let result = split_triangle(&tri, interior, edge_pt, &Tolerances::default());
        match result {
            SplitCase::Split(subs) => assert_eq!(subs.len(), 4),
            SplitCase::Unsupported { reason } => panic!("expected a split, got: {reason}"),
        }
    }

    #[test]
    fn no_intersection_on_disjoint_mesh() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        mesh.add_triangle("b", Point3d::new(10.0, 0.0, 0.0), Point3d::new(11.0, 0.0, 0.0), Point3d::new(10.0, 1.0, 0.0));
        let splits = split_self_intersecting_triangles(
            &mut mesh,
            &SelfIntersectConfig::default(),
            &CancellationToken::never(),
            &Tolerances::default(),
        )
        .unwrap();
        assert_eq!(splits, 0);
    }
}

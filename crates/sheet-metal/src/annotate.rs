//! Annotation Builder (§4.7): from the placed flat layout, derive bend
//! centerlines and the two crease edges bounding each unrolled cylindrical
//! face.

use std::collections::HashMap;

use mesh_core::topology::TopologyIndex;
use mesh_core::TaggedMesh;
use mesh_types::{FaceId, FaceKind, SheetSide, Vec2};

use crate::types::{BendAnnotations, BendCenterline, BendEdge, FlatFace, Placement};
use crate::unfold::CylindricalInsideMap;

fn to3(p: mesh_types::Point2d) -> [f32; 3] {
    [p.x as f32, p.y as f32, 0.0]
}

/// Resolve `toward_a`/`ambiguous` for one bend face, preserving the exact
/// rule from the source: `toward_a := (sheet_side != B) XOR (unrolled
/// outside normal points to A)`. The second term is read off the
/// classifier's inside/outside grouping — the outside face of a co-axial
/// pair is the one whose normal faces away from the axis, so "points to A"
/// is just "is not the inside face". A face with no `sheet_side` can't
/// evaluate the first term, so it's reported `ambiguous` instead of guessed.
fn resolve_toward_a(sheet_side: Option<SheetSide>, is_inside: bool) -> (bool, bool) {
    let Some(side) = sheet_side else { return (true, true) };
    let base = side != SheetSide::B;
    let outside_points_to_a = !is_inside;
    (base ^ outside_points_to_a, false)
}

/// Build bend annotations for every cylindrical face in the flat pattern
/// (§4.7). `cylindrical_inside` supplies each face's inside/outside role
/// from the classifier's co-axial grouping.
pub fn build_annotations(
    flat_faces: &HashMap<FaceId, FlatFace>,
    placements: &HashMap<FaceId, Placement>,
    topo: &TopologyIndex,
    mesh: &TaggedMesh,
    cylindrical_inside: &CylindricalInsideMap,
) -> BendAnnotations {
    let mut centerlines = Vec::new();
    let mut bend_edges = Vec::new();

    let mut faces: Vec<FaceId> = flat_faces.keys().copied().collect();
    faces.sort_by_key(|f| f.0);

    for face in faces {
        let flat = &flat_faces[&face];
        if flat.kind != FaceKind::Cylindrical {
            continue;
        }
        let Some(placement) = placements.get(&face) else { continue };

        let crease_points = crease_edges(mesh, topo, flat_faces, face, placement);
        if crease_points.is_empty() {
            continue;
        }

        let axis = dominant_axis(&crease_points);
        let perp = axis.perp();

        let mut min_offset = f64::INFINITY;
        let mut max_offset = f64::NEG_INFINITY;
        let mut axis_min = f64::INFINITY;
        let mut axis_max = f64::NEG_INFINITY;
        for &(a, b) in &crease_points {
            for p in [a, b] {
                let v = Vec2::new(p.x, p.y);
                let offset = v.dot(&perp);
                let along = v.dot(&axis);
                min_offset = min_offset.min(offset);
                max_offset = max_offset.max(offset);
                axis_min = axis_min.min(along);
                axis_max = axis_max.max(along);
            }
        }
        if !min_offset.is_finite() || !max_offset.is_finite() {
            continue;
        }

        let to_point = |along: f64, offset: f64| mesh_types::Point2d::new(axis.x * along + perp.x * offset, axis.y * along + perp.y * offset);

        for &offset in &[min_offset, max_offset] {
            let p0 = to_point(axis_min, offset);
            let p1 = to_point(axis_max, offset);
            bend_edges.push(BendEdge {
                p0: to3(p0),
                p1: to3(p1),
                face_id: face,
            });
        }

        let median = (min_offset + max_offset) * 0.5;
        let c0 = to_point(axis_min, median);
        let c1 = to_point(axis_max, median);

        let meta = mesh.face_meta().get(&face);
        let is_inside = cylindrical_inside.get(&face).copied().unwrap_or(true);
        let (toward_a, ambiguous) = resolve_toward_a(meta.and_then(|m| m.sheet_side), is_inside);

        centerlines.push(BendCenterline {
            p0: to3(c0),
            p1: to3(c1),
            face_id: face,
            toward_a,
            ambiguous,
        });
    }

    BendAnnotations { centerlines, bend_edges }
}

/// Boundary edges of `face`'s own triangles whose opposite triangle belongs
/// to a planar neighbor, expressed as placed 2D segments.
fn crease_edges(
    mesh: &TaggedMesh,
    topo: &TopologyIndex,
    flat_faces: &HashMap<FaceId, FlatFace>,
    face: FaceId,
    placement: &Placement,
) -> Vec<(mesh_types::Point2d, mesh_types::Point2d)> {
    let Some(flat) = flat_faces.get(&face) else { return Vec::new() };
    let mut out = Vec::new();
    let Some(neighbors) = topo.face_adj.get(&face) else { return out };
    for &neighbor in neighbors {
        let is_planar = mesh.face_meta().get(&neighbor).map(|m| m.kind == FaceKind::Planar).unwrap_or(false);
        if !is_planar {
            continue;
        }
        let Some(chains) = topo.chains_between(face, neighbor) else { continue };
        for chain in chains {
            for pair in chain.windows(2) {
                let (Some(a), Some(b)) = (flat.local(pair[0]), flat.local(pair[1])) else {
                    continue;
                };
                out.push((placement.apply(a), placement.apply(b)));
            }
        }
    }
    out
}

/// Dominant crease direction, weighted by segment length and orientation-
/// normalized against the first segment so opposite-facing edges don't
/// cancel in the sum (§4.7 "estimate the axis").
fn dominant_axis(segments: &[(mesh_types::Point2d, mesh_types::Point2d)]) -> Vec2 {
    let mut reference: Option<Vec2> = None;
    let mut sum = Vec2::new(0.0, 0.0);
    for &(a, b) in segments {
        let mut dir = Vec2::new(b.x - a.x, b.y - a.y);
        let len = dir.length();
        if len < 1e-15 {
            continue;
        }
        dir = Vec2::new(dir.x / len, dir.y / len);
        if let Some(r) = reference {
            if r.dot(&dir) < 0.0 {
                dir = Vec2::new(-dir.x, -dir.y);
            }
        } else {
            reference = Some(dir);
        }
        sum = Vec2::new(sum.x + dir.x * len, sum.y + dir.y * len);
    }
    sum.normalized().unwrap_or(Vec2::new(1.0, 0.0))
}

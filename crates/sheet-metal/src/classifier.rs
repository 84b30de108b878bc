//! Sheet-Metal Face Classifier (§4.4). Resolves the per-call sheet-metal
//! options against face metadata, figures out which nominal surface (A or
//! B) is the "inside" of the part's bends, and produces the `include_set`
//! of face-ids the neutral-fiber offsetter and unfolder treat as one
//! sub-mesh.

use std::collections::{HashMap, HashSet};

use mesh_core::topology::TopologyIndex;
use mesh_core::TaggedMesh;
use mesh_types::{FaceId, FaceKind, MeshError, SheetSide};

/// Per-call sheet-metal configuration (§6: `neutral_factor`, `thickness`,
/// `bend_radius`, `strict_surface_type`).
#[derive(Debug, Clone, Copy)]
pub struct ClassifierOptions {
    /// Explicit thickness; if `None` the classifier falls back to the
    /// first cylindrical co-axial group's `outside - inside` radius
    /// difference. Must resolve to a value `> 0` or `InvalidInput`.
    pub thickness: Option<f64>,
    pub bend_radius: Option<f64>,
    /// K-factor, the fraction of thickness at which the neutral fiber
    /// lies. Default 0.5.
    pub neutral_factor: f64,
    /// When `false`, the include set grows to cylindrical faces that
    /// neighbor an included planar face or whose radius matches the
    /// target within tolerance (§4.4).
    pub strict_surface_type: bool,
    pub radius_tolerance: f64,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            thickness: None,
            bend_radius: None,
            neutral_factor: 0.5,
            strict_surface_type: false,
            radius_tolerance: 1e-6,
        }
    }
}

/// The result of classification: everything the offsetter and unfolder
/// need to treat one nominal surface as a single sub-mesh.
#[derive(Debug, Clone)]
pub struct ClassifierResult {
    pub thickness: f64,
    pub bend_radius: Option<f64>,
    pub neutral_factor: f64,
    pub surface_type: SheetSide,
    pub inside_type: SheetSide,
    pub surface_is_inside: bool,
    pub include_set: HashSet<FaceId>,
}

/// `(axis, center)` quantized to a line-key so co-axial cylindrical faces
/// group together regardless of minor floating-point drift between them.
fn line_key(axis: mesh_types::Vec3, center: mesh_types::Point3d, tol: f64) -> (i64, i64, i64, i64, i64, i64) {
    let q = |v: f64| (v / tol).round() as i64;
    // Canonicalize the axis direction so `axis` and `-axis` key the same.
    let a = if axis.x < 0.0 || (axis.x == 0.0 && axis.y < 0.0) || (axis.x == 0.0 && axis.y == 0.0 && axis.z < 0.0) {
        -axis
    } else {
        axis
    };
    (q(a.x), q(a.y), q(a.z), q(center.x), q(center.y), q(center.z))
}

struct CylGroup {
    faces: Vec<FaceId>,
    min_radius: f64,
    max_radius: f64,
}

fn group_cylindrical_faces(mesh: &TaggedMesh, tol: f64) -> HashMap<(i64, i64, i64, i64, i64, i64), CylGroup> {
    let mut groups: HashMap<_, CylGroup> = HashMap::new();
    for (&face, meta) in mesh.face_meta() {
        if meta.kind != FaceKind::Cylindrical {
            continue;
        }
        let (Some(axis), Some(center), Some(radius)) = (meta.axis, meta.center, meta.radius) else {
            continue;
        };
        let key = line_key(axis, center, tol);
        let group = groups.entry(key).or_insert_with(|| CylGroup {
            faces: Vec::new(),
            min_radius: f64::INFINITY,
            max_radius: f64::NEG_INFINITY,
        });
        group.faces.push(face);
        group.min_radius = group.min_radius.min(radius);
        group.max_radius = group.max_radius.max(radius);
    }
    groups
}

/// Resolve which nominal sheet_side is the "inside" surface across every
/// co-axial cylindrical group found in the mesh: each group casts one vote
/// for whichever side has the smaller (inside) radius; majority decides.
fn vote_inside_type(mesh: &TaggedMesh, groups: &HashMap<(i64, i64, i64, i64, i64, i64), CylGroup>) -> Option<SheetSide> {
    let mut votes_a = 0usize;
    let mut votes_b = 0usize;
    for group in groups.values() {
        if group.faces.len() < 2 {
            continue;
        }
        // The face in this group whose radius is the minimum casts the
        // group's vote for its own sheet_side.
        let inside_face = group
            .faces
            .iter()
            .copied()
            .min_by(|&a, &b| {
                let ra = mesh.face_meta().get(&a).and_then(|m| m.radius).unwrap_or(f64::INFINITY);
                let rb = mesh.face_meta().get(&b).and_then(|m| m.radius).unwrap_or(f64::INFINITY);
                ra.partial_cmp(&rb).unwrap()
            });
        let Some(inside_face) = inside_face else { continue };
        match mesh.face_meta().get(&inside_face).and_then(|m| m.sheet_side) {
            Some(SheetSide::A) => votes_a += 1,
            Some(SheetSide::B) => votes_b += 1,
            None => {}
        }
    }
    match (votes_a, votes_b) {
        (0, 0) => None,
        (a, b) if a >= b => Some(SheetSide::A),
        _ => Some(SheetSide::B),
    }
}

/// The co-axial group that resolves `thickness`/`bend_radius`/the non-strict
/// include-set's `target_radius` when the caller didn't supply them
/// explicitly. Picking via `HashMap::values().find(...)` is nondeterministic
/// across runs once a part has more than one qualifying group (bends of
/// differing radius at the same thickness); this instead orders candidates
/// by `min_radius` first, breaking ties on the quantized line-key, so the
/// same group is always chosen for a given mesh.
fn select_primary_group(
    groups: &HashMap<(i64, i64, i64, i64, i64, i64), CylGroup>,
) -> Option<&CylGroup> {
    groups
        .iter()
        .filter(|(_, g)| g.faces.len() >= 2)
        .min_by(|(ka, ga), (kb, gb)| ga.min_radius.partial_cmp(&gb.min_radius).unwrap().then_with(|| ka.cmp(kb)))
        .map(|(_, g)| g)
}

fn present_sheet_sides(mesh: &TaggedMesh) -> (bool, bool) {
    let mut has_a = false;
    let mut has_b = false;
    for meta in mesh.face_meta().values() {
        match meta.sheet_side {
            Some(SheetSide::A) => has_a = true,
            Some(SheetSide::B) => has_b = true,
            None => {}
        }
    }
    (has_a, has_b)
}

/// Classify the mesh's sheet-metal faces (§4.4). `topo` supplies face
/// adjacency for the non-strict include-set expansion.
pub fn classify(mesh: &TaggedMesh, topo: &TopologyIndex, opts: &ClassifierOptions) -> Result<ClassifierResult, MeshError> {
    let groups = group_cylindrical_faces(mesh, opts.radius_tolerance.max(1e-9));
    let primary_group = select_primary_group(&groups);

    let thickness = opts.thickness.or_else(|| primary_group.map(|g| g.max_radius - g.min_radius));
    let thickness = match thickness {
        Some(t) if t > 0.0 => t,
        _ => return Err(MeshError::invalid_input("sheet-metal thickness could not be resolved to a value > 0")),
    };

    let bend_radius = opts.bend_radius.or_else(|| primary_group.map(|g| g.min_radius));

    let (has_a, has_b) = present_sheet_sides(mesh);
    let surface_type = if has_a {
        SheetSide::A
    } else if has_b {
        SheetSide::B
    } else {
        return Err(MeshError::invalid_input("no face carries a sheet_side tag"));
    };

    let inside_type = vote_inside_type(mesh, &groups).unwrap_or(surface_type);
    let surface_is_inside = surface_type == inside_type;

    let target_radius = primary_group.map(|g| if surface_is_inside { g.min_radius } else { g.max_radius });

    let mut include_set: HashSet<FaceId> = mesh
        .face_meta()
        .iter()
        .filter(|(_, meta)| meta.kind == FaceKind::Planar && meta.sheet_side == Some(surface_type))
        .map(|(&id, _)| id)
        .collect();

    if !opts.strict_surface_type {
        let mut added: Vec<FaceId> = Vec::new();
        for (&face, meta) in mesh.face_meta() {
            if meta.kind != FaceKind::Cylindrical || include_set.contains(&face) {
                continue;
            }
            let neighbors_included = topo
                .face_adj
                .get(&face)
                .map(|neighbors| neighbors.iter().any(|n| include_set.contains(n)))
                .unwrap_or(false);
            let radius_matches = match (meta.radius, target_radius) {
                (Some(r), Some(target)) => (r - target).abs() <= opts.radius_tolerance.max(1e-6),
                _ => false,
            };
            if neighbors_included || radius_matches {
                added.push(face);
            }
        }
        include_set.extend(added);
    }

    Ok(ClassifierResult {
        thickness,
        bend_radius,
        neutral_factor: opts.neutral_factor,
        surface_type,
        inside_type,
        surface_is_inside,
        include_set,
    })
}

/// For every cylindrical face in a co-axial group of two or more, whether
/// it carries the group's minimum (inside) radius. Used by the unfolder's
/// neutral-radius calculation and the annotation builder's `toward_a` rule
/// (§4.6, §4.7) — independent of which nominal surface the caller selected.
pub fn cylindrical_inside_map(mesh: &TaggedMesh, tol: f64) -> HashMap<FaceId, bool> {
    let groups = group_cylindrical_faces(mesh, tol.max(1e-9));
    let mut map = HashMap::new();
    for group in groups.values() {
        if group.faces.len() < 2 {
            continue;
        }
        for &face in &group.faces {
            let radius = mesh.face_meta().get(&face).and_then(|m| m.radius).unwrap_or(group.min_radius);
            map.insert(face, (radius - group.min_radius).abs() <= (radius - group.max_radius).abs());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::TaggedMesh;
    use mesh_types::{FaceMeta, Point3d, Vec3};

    fn quarter_cylinder_pair() -> TaggedMesh {
        let mut mesh = TaggedMesh::new();
        let axis = Vec3::Z;
        let center = Point3d::ORIGIN;
        mesh.add_triangle("inside", Point3d::new(3.0, 0.0, 0.0), Point3d::new(0.0, 3.0, 0.0), Point3d::new(3.0, 0.0, 1.0));
        mesh.add_triangle("outside", Point3d::new(5.0, 0.0, 0.0), Point3d::new(0.0, 5.0, 0.0), Point3d::new(5.0, 0.0, 1.0));
        let inside_id = mesh.face_name().id_of("inside").unwrap();
        let outside_id = mesh.face_name().id_of("outside").unwrap();
        mesh.face_meta_mut().insert(inside_id, FaceMeta::cylindrical(axis, center, 3.0).with_side(SheetSide::A));
        mesh.face_meta_mut().insert(outside_id, FaceMeta::cylindrical(axis, center, 5.0).with_side(SheetSide::B));
        mesh
    }

    #[test]
    fn resolves_thickness_from_coaxial_radii() {
        let mesh = quarter_cylinder_pair();
        let topo = TopologyIndex::build(&mesh);
        let result = classify(&mesh, &topo, &ClassifierOptions::default()).unwrap();
        assert!((result.thickness - 2.0).abs() < 1e-9);
        assert_eq!(result.inside_type, SheetSide::A);
    }

    #[test]
    fn explicit_thickness_overrides_resolution() {
        let mesh = quarter_cylinder_pair();
        let topo = TopologyIndex::build(&mesh);
        let opts = ClassifierOptions {
            thickness: Some(2.5),
            ..ClassifierOptions::default()
        };
        let result = classify(&mesh, &topo, &opts).unwrap();
        assert!((result.thickness - 2.5).abs() < 1e-9);
    }

    #[test]
    fn missing_thickness_is_invalid_input() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let id = mesh.face_name().id_of("a").unwrap();
        mesh.face_meta_mut().insert(id, FaceMeta::planar().with_side(SheetSide::A));
        let topo = TopologyIndex::build(&mesh);
        let err = classify(&mesh, &topo, &ClassifierOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidInput { .. }));
    }
}

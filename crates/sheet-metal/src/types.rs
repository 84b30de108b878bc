//! Data model for the sheet-metal half of the crate (§3, Flat Face /
//! Placement / Flat Pattern; §4.4-§4.7). Kept separate from
//! [`mesh_core::mesh::TaggedMesh`] because a flat face's coordinates are a
//! per-face local parametrization, not a mesh the repair operators ever
//! see.

use std::collections::HashMap;

use mesh_types::{FaceId, FaceKind, Point2d, Point3d, VertIdx, Vec3};
use serde::{Deserialize, Serialize};

/// The 3D frame a `FlatFace`'s local coordinates were measured against:
/// origin, in-plane basis `(u, v)`, and the face's outward normal.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub origin: Point3d,
    pub u: Vec3,
    pub v: Vec3,
    pub normal: Vec3,
}

/// One face of the repaired mesh, parametrized to 2D (§4.6 "Per-face
/// parametrization"). `coords` is local to this face alone; placement onto
/// the shared layout plane happens separately (`Placement`).
#[derive(Debug, Clone)]
pub struct FlatFace {
    pub face: FaceId,
    pub kind: FaceKind,
    pub coords: HashMap<VertIdx, Point2d>,
    pub basis_3d: Frame,
    pub boundary_chains: Vec<Vec<VertIdx>>,
    pub area: f64,
}

impl FlatFace {
    pub fn local(&self, v: VertIdx) -> Option<Point2d> {
        self.coords.get(&v).copied()
    }
}

/// A 2D rigid transform (§3 "Placement"): rotation by `(cos, sin)`,
/// translation `(tx, ty)`, with an optional reflection applied before the
/// rotation (the unfolder's reflection-check, §4.6 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub cos: f64,
    pub sin: f64,
    pub tx: f64,
    pub ty: f64,
    pub reflected: bool,
}

impl Placement {
    pub fn identity() -> Self {
        Self {
            cos: 1.0,
            sin: 0.0,
            tx: 0.0,
            ty: 0.0,
            reflected: false,
        }
    }

    /// Rotation by `(cos, sin)` and translation `(tx, ty)`, reflecting
    /// across the local x-axis first when `reflected`.
    pub fn new(cos: f64, sin: f64, tx: f64, ty: f64, reflected: bool) -> Self {
        Self { cos, sin, tx, ty, reflected }
    }

    pub fn apply(&self, p: Point2d) -> Point2d {
        let (x, y) = if self.reflected { (p.x, -p.y) } else { (p.x, p.y) };
        Point2d::new(self.cos * x - self.sin * y + self.tx, self.sin * x + self.cos * y + self.ty)
    }

    pub fn apply_vec(&self, v: mesh_types::Vec2) -> mesh_types::Vec2 {
        let (x, y) = if self.reflected { (v.x, -v.y) } else { (v.x, v.y) };
        mesh_types::Vec2::new(self.cos * x - self.sin * y, self.sin * x + self.cos * y)
    }

    /// Offset the placement's translation by a fixed 2D vector, used when
    /// laying out connected components left-to-right (§4.6 step 6).
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self { tx: self.tx + dx, ty: self.ty + dy, ..*self }
    }
}

/// One step of the placement BFS, recorded when `debug_placement_steps` is
/// set (§6 configuration).
#[derive(Debug, Clone)]
pub struct PlacementStep {
    pub face: FaceId,
    pub placement: Placement,
}

/// A bend centerline, tagged `toward_a` per the exact rule preserved from
/// the source (§4.7, DESIGN NOTES open question). `ambiguous` is set
/// instead of silently guessing when the rule can't be evaluated
/// consistently for this face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BendCenterline {
    pub p0: [f32; 3],
    pub p1: [f32; 3],
    pub face_id: FaceId,
    pub toward_a: bool,
    pub ambiguous: bool,
}

/// One of the two crease edges bounding an unrolled cylindrical face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BendEdge {
    pub p0: [f32; 3],
    pub p1: [f32; 3],
    pub face_id: FaceId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BendAnnotations {
    pub centerlines: Vec<BendCenterline>,
    pub bend_edges: Vec<BendEdge>,
}

/// Output bundle of the unfolder (§3 "Flat Pattern", §6 "Flat-pattern
/// output").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatPattern {
    pub positions: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
    pub tri_face: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
    pub thickness: f64,
    pub bend_annotations: BendAnnotations,
    /// §7 `DisconnectedFlatPattern`: set when the placement BFS produced
    /// more than one connected component. The pattern still includes every
    /// component; this is a diagnostic, not an error.
    pub disconnected: bool,
    pub debug_steps: Option<Vec<PlacementStep>>,
}

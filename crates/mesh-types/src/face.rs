use serde::{Deserialize, Serialize};

use crate::{FaceId, Vec3};

/// The geometric interpretation of a face, carried from the CAD model that
/// produced the triangle soup. Drives both the repair pipeline's
/// internal/external classification heuristics and the sheet-metal
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceKind {
    Planar,
    Cylindrical,
    Other,
}

/// Which side of the sheet-metal part a face belongs to. A sheet has two
/// offset copies of the same nominal surface, one per side, plus the bend
/// faces connecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetSide {
    A,
    B,
}

/// Per-face metadata attached by the caller (or inherited from the source
/// CAD model). Only the fields relevant to repair and sheet-metal unfolding
/// are modeled; scene-graph concerns (materials, visibility, picking) live
/// outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMeta {
    pub kind: FaceKind,
    /// Unit axis direction, required when `kind == Cylindrical`.
    pub axis: Option<Vec3>,
    /// A point on the cylinder's axis, required when `kind == Cylindrical`.
    pub center: Option<crate::Point3d>,
    /// Cylinder radius, required when `kind == Cylindrical`.
    pub radius: Option<f64>,
    pub sheet_side: Option<SheetSide>,
    pub color: Option<[u8; 3]>,
}

impl Default for FaceMeta {
    fn default() -> Self {
        Self {
            kind: FaceKind::Other,
            axis: None,
            center: None,
            radius: None,
            sheet_side: None,
            color: None,
        }
    }
}

impl FaceMeta {
    pub fn planar() -> Self {
        Self {
            kind: FaceKind::Planar,
            ..Self::default()
        }
    }

    pub fn cylindrical(axis: Vec3, center: crate::Point3d, radius: f64) -> Self {
        Self {
            kind: FaceKind::Cylindrical,
            axis: Some(axis),
            center: Some(center),
            radius: Some(radius),
            ..Self::default()
        }
    }

    pub fn with_side(mut self, side: SheetSide) -> Self {
        self.sheet_side = Some(side);
        self
    }
}

/// A `FaceId` paired with its human-readable name, maintained bijectively by
/// the `TaggedMesh` (invariant I7 of the data model).
#[derive(Debug, Clone, Default)]
pub struct FaceNameTable {
    names: std::collections::HashMap<FaceId, String>,
    ids: std::collections::HashMap<String, FaceId>,
    next: u32,
}

impl FaceNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the `FaceId` for `name`, assigning a fresh one if unseen.
    pub fn intern(&mut self, name: &str) -> FaceId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = FaceId(self.next);
        self.next += 1;
        self.names.insert(id, name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn name_of(&self, id: FaceId) -> Option<&str> {
        self.names.get(&id).map(|s| s.as_str())
    }

    pub fn id_of(&self, name: &str) -> Option<FaceId> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

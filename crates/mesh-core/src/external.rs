//! Wire shapes for the crate's external interfaces (§6): mesh ingress and
//! egress, and the per-face metadata record. Kept separate from
//! [`crate::mesh::TaggedMesh`] because the wire format is a flat,
//! serialization-friendly shape (parallel `f32`/`u32` arrays) while the
//! in-memory mesh uses `Point3d` rows and a `FaceId` newtype — converting
//! between the two is this module's entire job.

use std::collections::HashMap;

use mesh_types::{FaceId, FaceKind, FaceMeta, MeshError, Point3d, SheetSide, Vec3};
use serde::{Deserialize, Serialize};

use crate::mesh::TaggedMesh;

/// `{ vert_properties: f32[3V], tri_verts: u32[3T], tri_ids: u32[T]? }` —
/// the shape shared by mesh ingress, mesh egress, and the opaque
/// [`crate::manifold::ManifoldEngine`] collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMesh {
    pub vert_properties: Vec<f32>,
    pub tri_verts: Vec<u32>,
    pub tri_ids: Vec<u32>,
}

impl RawMesh {
    pub fn vertex_count(&self) -> usize {
        self.vert_properties.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.tri_verts.len() / 3
    }

    pub fn position(&self, v: u32) -> Point3d {
        let i = v as usize * 3;
        Point3d::new(
            self.vert_properties[i] as f64,
            self.vert_properties[i + 1] as f64,
            self.vert_properties[i + 2] as f64,
        )
    }

    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let i = t * 3;
        [self.tri_verts[i], self.tri_verts[i + 1], self.tri_verts[i + 2]]
    }

    /// Validate the shape invariants expected by every consumer: array
    /// lengths line up and every triangle index is in range. Returns
    /// `InvalidInput` (§7) on the first violation found.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.vert_properties.len() % 3 != 0 {
            return Err(MeshError::invalid_input("vert_properties length not a multiple of 3"));
        }
        if self.tri_verts.len() % 3 != 0 {
            return Err(MeshError::invalid_input("tri_verts length not a multiple of 3"));
        }
        if !self.tri_ids.is_empty() && self.tri_ids.len() != self.triangle_count() {
            return Err(MeshError::invalid_input("tri_ids length does not match triangle count"));
        }
        let v = self.vertex_count() as u32;
        for &idx in &self.tri_verts {
            if idx >= v {
                return Err(MeshError::invalid_input(format!(
                    "triangle references vertex {idx} but only {v} vertices exist"
                )));
            }
        }
        if self.vert_properties.iter().any(|c| !c.is_finite()) {
            return Err(MeshError::invalid_input("non-finite coordinate in vert_properties"));
        }
        Ok(())
    }
}

/// `{ kind, axis?, center?, radius?, sheet_side?, color?, name }` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceMetaWire {
    pub kind: String,
    pub axis: Option<[f64; 3]>,
    pub center: Option<[f64; 3]>,
    pub radius: Option<f64>,
    pub sheet_side: Option<String>,
    pub color: Option<[u8; 3]>,
    pub name: String,
}

impl FaceMetaWire {
    pub fn to_face_meta(&self) -> Result<FaceMeta, MeshError> {
        let kind = match self.kind.as_str() {
            "planar" => FaceKind::Planar,
            "cylindrical" => FaceKind::Cylindrical,
            "other" => FaceKind::Other,
            other => return Err(MeshError::invalid_input(format!("unknown face kind: {other}"))),
        };
        let axis = match self.axis {
            Some(a) => {
                let v = Vec3::from_array(a);
                let unit = v
                    .normalized()
                    .ok_or_else(|| MeshError::invalid_input("cylindrical face axis has zero length"))?;
                if (unit.length() - 1.0).abs() > 1e-6 {
                    return Err(MeshError::invalid_input("cylindrical face axis is not unit length"));
                }
                Some(unit)
            }
            None => None,
        };
        if kind == FaceKind::Cylindrical {
            if axis.is_none() {
                return Err(MeshError::invalid_input("cylindrical face missing axis"));
            }
            if self.radius.map(|r| r <= 0.0).unwrap_or(true) {
                return Err(MeshError::invalid_input("cylindrical face radius must be > 0"));
            }
        }
        let sheet_side = match self.sheet_side.as_deref() {
            Some("A") => Some(SheetSide::A),
            Some("B") => Some(SheetSide::B),
            Some(other) => return Err(MeshError::invalid_input(format!("unknown sheet side: {other}"))),
            None => None,
        };
        Ok(FaceMeta {
            kind,
            axis,
            center: self.center.map(Point3d::from_array),
            radius: self.radius,
            sheet_side,
            color: self.color,
        })
    }

    pub fn from_face_meta(meta: &FaceMeta, name: &str) -> Self {
        Self {
            kind: match meta.kind {
                FaceKind::Planar => "planar",
                FaceKind::Cylindrical => "cylindrical",
                FaceKind::Other => "other",
            }
            .to_string(),
            axis: meta.axis.map(|a| a.to_array()),
            center: meta.center.map(|c| c.to_array()),
            radius: meta.radius,
            sheet_side: meta.sheet_side.map(|s| match s {
                SheetSide::A => "A".to_string(),
                SheetSide::B => "B".to_string(),
            }),
            color: meta.color,
            name: name.to_string(),
        }
    }
}

/// Build a [`TaggedMesh`] from the ingress wire shapes: a `RawMesh` plus a
/// `face_id -> FaceMetaWire` map (the metadata carries the face name, so a
/// separate name map isn't needed on ingress).
pub fn tagged_mesh_from_raw(
    raw: &RawMesh,
    face_meta: &HashMap<u32, FaceMetaWire>,
) -> Result<TaggedMesh, MeshError> {
    raw.validate()?;
    let mut mesh = TaggedMesh::new();
    let tri_count = raw.triangle_count();
    for t in 0..tri_count {
        let [a, b, c] = raw.triangle(t);
        let face_idx = if raw.tri_ids.is_empty() { 0 } else { raw.tri_ids[t] };
        let wire = face_meta
            .get(&face_idx)
            .ok_or_else(|| MeshError::invalid_input(format!("no metadata for face {face_idx}")))?;
        mesh.add_triangle(&wire.name, raw.position(a), raw.position(b), raw.position(c));
    }
    for wire in face_meta.values() {
        // A face referenced only in metadata (no triangle uses it yet) is
        // still registered, so round-tripping preserves empty faces.
        let id = mesh.face_name.intern(&wire.name);
        mesh.face_meta.insert(id, wire.to_face_meta()?);
    }
    Ok(mesh)
}

/// Flatten a [`TaggedMesh`] to the egress wire shape plus a parallel
/// `FaceId -> FaceMetaWire` map.
pub fn raw_from_tagged_mesh(mesh: &TaggedMesh) -> (RawMesh, HashMap<u32, FaceMetaWire>) {
    let mut vert_properties = Vec::with_capacity(mesh.positions().len() * 3);
    for p in mesh.positions() {
        vert_properties.push(p.x as f32);
        vert_properties.push(p.y as f32);
        vert_properties.push(p.z as f32);
    }
    let mut tri_verts = Vec::with_capacity(mesh.triangles().len() * 3);
    let mut tri_ids = Vec::with_capacity(mesh.triangles().len());
    for (tri, face) in mesh.triangles().iter().zip(mesh.tri_face().iter()) {
        tri_verts.extend_from_slice(tri);
        tri_ids.push(face.0);
    }
    let mut meta = HashMap::new();
    for (id, face_meta) in mesh.face_meta() {
        let name = mesh.face_name().name_of(*id).unwrap_or("").to_string();
        meta.insert(id.0, FaceMetaWire::from_face_meta(face_meta, &name));
    }
    (
        RawMesh {
            vert_properties,
            tri_verts,
            tri_ids,
        },
        meta,
    )
}

pub fn to_face_id(idx: u32) -> FaceId {
    FaceId(idx)
}

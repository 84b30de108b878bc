//! Flat-Pattern Unfolder (§4.6): parametrize each included face to 2D, place
//! every face onto one shared layout plane by BFS, lay out disjoint
//! components left-to-right, and assemble the welded output mesh.

pub mod param;
pub mod placement;

use std::collections::{HashMap, HashSet};

use mesh_core::topology::TopologyIndex;
use mesh_core::TaggedMesh;
use mesh_types::{FaceId, FaceKind, MeshError};

use crate::types::FlatFace;

/// Per-face "is this the inside surface" lookup for cylindrical faces,
/// produced by [`crate::classifier::cylindrical_inside_map`]. Faces absent
/// from the map (planar, or cylindrical but not part of a co-axial pair)
/// default to `true`.
pub type CylindricalInsideMap = HashMap<FaceId, bool>;

/// Unfold every face in `include_set` onto a single flat layout (§4.6).
/// `debug_steps` mirrors the `debug_placement_steps` configuration knob
/// (§6): when set, the BFS placement order is recorded on the result.
pub fn unfold_flat_pattern(
    mesh: &TaggedMesh,
    topo: &TopologyIndex,
    include_set: &HashSet<FaceId>,
    cylindrical_inside: &CylindricalInsideMap,
    thickness: f64,
    neutral_factor: f64,
    debug_steps: bool,
) -> Result<crate::types::FlatPattern, MeshError> {
    let mut flat_faces: HashMap<FaceId, FlatFace> = HashMap::new();
    for &face in include_set {
        let Some(meta) = mesh.face_meta().get(&face) else { continue };
        let flat = match meta.kind {
            FaceKind::Planar => param::parametrize_planar(mesh, topo, face),
            FaceKind::Cylindrical => {
                let is_inside = cylindrical_inside.get(&face).copied().unwrap_or(true);
                param::parametrize_cylindrical(mesh, topo, face, meta, thickness, neutral_factor, is_inside)
            }
            FaceKind::Other => None,
        };
        if let Some(flat) = flat {
            flat_faces.insert(face, flat);
        }
    }

    if flat_faces.is_empty() {
        return Err(MeshError::invalid_input("sheet-metal include set produced no parametrizable faces"));
    }

    let (placements, disconnected, steps) = placement::place_faces(topo, &flat_faces, thickness, debug_steps);
    let mut pattern = placement::assemble_flat_pattern(mesh, topo, &flat_faces, &placements, thickness, disconnected, steps);
    pattern.bend_annotations = crate::annotate::build_annotations(&flat_faces, &placements, topo, mesh, cylindrical_inside);
    Ok(pattern)
}

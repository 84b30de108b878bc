//! The opaque manifold-boolean collaborator (§6). The repair pipeline never
//! implements Boolean geometry itself — it calls through this trait for the
//! two operations that need it: `collapse_tiny_triangles`'s bounding-box
//! intersection cleanup, and `remove_internal_triangles`'s `Manifold`
//! strategy (a full shell rebuild).
//!
//! [`MockManifoldEngine`] is the crate's own deterministic test double,
//! grounded on the teacher's `MockKernel` pattern. A real backend (wrapping
//! an actual triangle-mesh boolean library) lives in the sibling
//! `kernel-fork` crate so this crate never depends on one concretely.

use std::collections::HashMap;

use thiserror::Error;

pub use crate::external::RawMesh;

#[derive(Debug, Error, Clone)]
pub enum ManifoldError {
    #[error("manifold engine build failed: {reason}")]
    BuildFailed { reason: String },

    #[error("manifold engine has no overlap to intersect")]
    NoOverlap,

    #[error("unknown manifold handle")]
    UnknownHandle,
}

/// Opaque handle to a solid held by a `ManifoldEngine` implementation.
/// Never introspected directly by this crate — always round-tripped
/// through [`ManifoldEngine::get_mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifoldHandle(pub u64);

/// `build(vert_properties, tri_verts, tri_ids) -> ManifoldHandle`,
/// `handle.intersect(other) -> ManifoldHandle`, `handle.get_mesh() -> RawMesh`,
/// `handle.delete()` (§6). Implementations own whatever native resources
/// back a handle; `delete` releases them.
pub trait ManifoldEngine {
    fn build(&mut self, mesh: &RawMesh) -> Result<ManifoldHandle, ManifoldError>;
    fn intersect(&mut self, a: ManifoldHandle, b: ManifoldHandle) -> Result<ManifoldHandle, ManifoldError>;
    fn get_mesh(&mut self, handle: ManifoldHandle) -> Result<RawMesh, ManifoldError>;
    fn delete(&mut self, handle: ManifoldHandle);
}

/// Deterministic in-memory `ManifoldEngine` used by the crate's own tests
/// and by the integration harness when a real boolean backend isn't wanted.
///
/// `build` simulates a manifold rebuild by cancelling exactly-coincident,
/// oppositely-wound triangle pairs — the signature left behind when two
/// solids touch along a shared internal face (scenario S2). `intersect`
/// clips against the second handle's bounding box and re-runs the same
/// cancellation pass, which is exactly what `collapse_tiny_triangles` needs
/// from "intersect with an inflated AABB that already contains everything".
#[derive(Default)]
pub struct MockManifoldEngine {
    next_id: u64,
    store: HashMap<u64, RawMesh>,
}

impl MockManifoldEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, mesh: RawMesh) -> ManifoldHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.store.insert(id, mesh);
        ManifoldHandle(id)
    }

    fn rebuild(mesh: &RawMesh) -> RawMesh {
        let tri_count = mesh.triangle_count();
        let mut key_of = |t: usize| -> ([u32; 3], bool) {
            let tri = mesh.triangle(t);
            let mut sorted = tri;
            sorted.sort_unstable();
            // CCW-ness relative to the sorted key: count inversions parity.
            let ccw = tri == sorted
                || (tri[0] == sorted[1] && tri[1] == sorted[2] && tri[2] == sorted[0])
                || (tri[0] == sorted[2] && tri[1] == sorted[0] && tri[2] == sorted[1]);
            (sorted, ccw)
        };
        let mut cancelled = vec![false; tri_count];
        let mut by_key: HashMap<[u32; 3], Vec<usize>> = HashMap::new();
        for t in 0..tri_count {
            let (key, _) = key_of(t);
            by_key.entry(key).or_default().push(t);
        }
        for group in by_key.values() {
            if group.len() < 2 {
                continue;
            }
            let mut ccw_indices = vec![];
            let mut cw_indices = vec![];
            for &t in group {
                let (_, ccw) = key_of(t);
                if ccw {
                    ccw_indices.push(t);
                } else {
                    cw_indices.push(t);
                }
            }
            let cancel_count = ccw_indices.len().min(cw_indices.len());
            for i in 0..cancel_count {
                cancelled[ccw_indices[i]] = true;
                cancelled[cw_indices[i]] = true;
            }
        }
        let mut tri_verts = Vec::new();
        let mut tri_ids = Vec::new();
        for t in 0..tri_count {
            if cancelled[t] {
                continue;
            }
            tri_verts.extend_from_slice(&mesh.triangle(t));
            if !mesh.tri_ids.is_empty() {
                tri_ids.push(mesh.tri_ids[t]);
            }
        }
        RawMesh {
            vert_properties: mesh.vert_properties.clone(),
            tri_verts,
            tri_ids,
        }
    }
}

impl ManifoldEngine for MockManifoldEngine {
    fn build(&mut self, mesh: &RawMesh) -> Result<ManifoldHandle, ManifoldError> {
        if mesh.vert_properties.iter().any(|c| !c.is_finite()) {
            return Err(ManifoldError::BuildFailed {
                reason: "non-finite coordinate".to_string(),
            });
        }
        Ok(self.insert(Self::rebuild(mesh)))
    }

    fn intersect(&mut self, a: ManifoldHandle, b: ManifoldHandle) -> Result<ManifoldHandle, ManifoldError> {
        let mesh_a = self.store.get(&a.0).ok_or(ManifoldError::UnknownHandle)?.clone();
        let _mesh_b = self.store.get(&b.0).ok_or(ManifoldError::UnknownHandle)?;
        Ok(self.insert(Self::rebuild(&mesh_a)))
    }

    fn get_mesh(&mut self, handle: ManifoldHandle) -> Result<RawMesh, ManifoldError> {
        self.store.get(&handle.0).cloned().ok_or(ManifoldError::UnknownHandle)
    }

    fn delete(&mut self, handle: ManifoldHandle) {
        self.store.remove(&handle.0);
    }
}

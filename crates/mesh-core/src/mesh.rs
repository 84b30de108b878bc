//! The Tagged Mesh Store (§4.1): the crate's single owned data structure.

use std::collections::HashMap;

use mesh_types::{FaceId, FaceMeta, FaceNameTable, MeshError, Point3d, VertIdx};
use tracing::debug;

use crate::manifold::{ManifoldEngine, RawMesh};

/// Monotonic version counter, bumped on every mutation. Replaces the
/// source's boolean dirty flag (ref. REDESIGN FLAGS in SPEC_FULL.md §9): a
/// cached `TopologyIndex` or manifold view carries the version it was built
/// from, so a stale borrow is detectable rather than silently reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshVersion(pub(crate) u64);

/// A free-floating polyline annotation that isn't part of the triangulated
/// surface (dimension leaders, sketch overlays forwarded from the caller).
/// Repair operators never touch these; they ride along unchanged.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    pub points: Vec<Point3d>,
}

struct ManifoldCache {
    version: MeshVersion,
    mesh: RawMesh,
}

/// Quantized vertex key used by `add_triangle`'s welding map. Coordinates
/// are rounded to a lattice of spacing `weld_tolerance` (0 meaning exact
/// bit-for-bit welding, the default).
fn vert_key(p: Point3d, tolerance: f64) -> (i64, i64, i64) {
    if tolerance <= 0.0 {
        // Exact welding: hash the raw bit pattern so -0.0 and 0.0 still
        // collide (both round to the same bits after a `+ 0.0` normalize).
        let norm = |v: f64| if v == 0.0 { 0.0 } else { v };
        return (
            norm(p.x).to_bits() as i64,
            norm(p.y).to_bits() as i64,
            norm(p.z).to_bits() as i64,
        );
    }
    let q = |v: f64| (v / tolerance).round() as i64;
    (q(p.x), q(p.y), q(p.z))
}

/// The in-memory representation of a face-tagged indexed triangle mesh
/// (§3). Owns every buffer the repair pipeline and the unfolder operate
/// on: vertex positions, triangle indices, a per-triangle face tag, and the
/// semantic metadata attached to each face.
pub struct TaggedMesh {
    positions: Vec<Point3d>,
    triangles: Vec<[u32; 3]>,
    tri_face: Vec<FaceId>,
    pub(crate) face_meta: HashMap<FaceId, FaceMeta>,
    pub(crate) face_name: FaceNameTable,
    pub aux_edges: Vec<Polyline>,
    /// Welding tolerance for `add_triangle`; 0.0 means exact-coordinate
    /// welding (the spec's default), a positive value enables ε-tolerant
    /// welding.
    pub weld_tolerance: f64,

    version: MeshVersion,
    vert_lookup: HashMap<(i64, i64, i64), VertIdx>,
    manifold_cache: Option<ManifoldCache>,
}

impl Default for TaggedMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl TaggedMesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            triangles: Vec::new(),
            tri_face: Vec::new(),
            face_meta: HashMap::new(),
            face_name: FaceNameTable::new(),
            aux_edges: Vec::new(),
            weld_tolerance: 0.0,
            version: MeshVersion(0),
            vert_lookup: HashMap::new(),
            manifold_cache: None,
        }
    }

    pub fn version(&self) -> MeshVersion {
        self.version
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn positions(&self) -> &[Point3d] {
        &self.positions
    }

    /// Mutable access for operators that reposition vertices in place (the
    /// neutral-fiber offsetter, remesh's midpoint insertion). Callers
    /// **must** call [`TaggedMesh::touch`] afterward — direct field access
    /// bypasses the version bump that invalidates cached topology.
    pub fn positions_mut(&mut self) -> &mut Vec<Point3d> {
        &mut self.positions
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn tri_face(&self) -> &[FaceId] {
        &self.tri_face
    }

    pub fn face_meta(&self) -> &HashMap<FaceId, FaceMeta> {
        &self.face_meta
    }

    pub fn face_meta_mut(&mut self) -> &mut HashMap<FaceId, FaceMeta> {
        &mut self.face_meta
    }

    pub fn face_name(&self) -> &FaceNameTable {
        &self.face_name
    }

    /// Bump the version counter and drop every cache keyed on it. Every
    /// operator that mutates the mesh in place (rather than through
    /// `add_triangle`/`replace_topology`, which call this themselves) must
    /// call this exactly once when it has finished, not per-edit.
    pub fn touch(&mut self) -> MeshVersion {
        self.version.0 += 1;
        self.manifold_cache = None;
        self.version
    }

    /// Insert or de-duplicate each vertex (exact-equality welding by
    /// default, or ε-tolerant if `weld_tolerance > 0`), append a triangle,
    /// and map `face_name` to a `FaceId` (assigning a fresh one if new).
    ///
    /// Contract (P1): never creates duplicate vertices for identical input
    /// coordinates; vertex indices are stable across non-mutating queries.
    pub fn add_triangle(
        &mut self,
        face_name: &str,
        p0: Point3d,
        p1: Point3d,
        p2: Point3d,
    ) -> (mesh_types::TriIdx, [VertIdx; 3]) {
        let verts = [p0, p1, p2].map(|p| self.weld_vertex(p));
        let tri_idx = mesh_types::TriIdx(self.triangles.len() as u32);
        self.triangles.push(verts.map(|v| v.0));
        let face_id = self.face_name.intern(face_name);
        self.face_meta.entry(face_id).or_insert_with(FaceMeta::default);
        self.tri_face.push(face_id);
        self.touch();
        (tri_idx, verts)
    }

    fn weld_vertex(&mut self, p: Point3d) -> VertIdx {
        let key = vert_key(p, self.weld_tolerance);
        if let Some(&idx) = self.vert_lookup.get(&key) {
            return idx;
        }
        let idx = VertIdx(self.positions.len() as u32);
        self.positions.push(p);
        self.vert_lookup.insert(key, idx);
        idx
    }

    /// Deep copy of every buffer and map; caches are dropped (R1).
    pub fn deep_clone(&self) -> Self {
        Self {
            positions: self.positions.clone(),
            triangles: self.triangles.clone(),
            tri_face: self.tri_face.clone(),
            face_meta: self.face_meta.clone(),
            face_name: self.face_name.clone(),
            aux_edges: self.aux_edges.clone(),
            weld_tolerance: self.weld_tolerance,
            version: self.version,
            vert_lookup: self.vert_lookup.clone(),
            manifold_cache: None,
        }
    }

    /// Drop the cached manifold view and bump the version. Idempotent
    /// (calling twice in a row is identical to calling once): the mesh
    /// remains usable and re-caches lazily on the next `get_mesh` (R2).
    pub fn free(&mut self) {
        self.manifold_cache = None;
        self.touch();
    }

    /// Wholesale replace the triangle soup (positions, triangle indices,
    /// per-triangle face ids), rebuilding the weld lookup. Used by
    /// operators that produce an entirely new vertex/triangle set rather
    /// than editing in place (remesh, internal-triangle removal, the
    /// edge-collapse cleanup's adopted result).
    pub fn replace_topology(&mut self, positions: Vec<Point3d>, triangles: Vec<[u32; 3]>, tri_face: Vec<FaceId>) {
        debug_assert_eq!(triangles.len(), tri_face.len());
        self.vert_lookup.clear();
        for (idx, p) in positions.iter().enumerate() {
            self.vert_lookup.insert(vert_key(*p, self.weld_tolerance), VertIdx(idx as u32));
        }
        self.positions = positions;
        self.triangles = triangles;
        self.tri_face = tri_face;
        self.touch();
    }

    /// Return the cached manifoldized view of the mesh, re-running the
    /// manifoldization pass through `engine` if the cache is stale relative
    /// to the current version.
    pub fn get_mesh(&mut self, engine: &mut dyn ManifoldEngine) -> Result<&RawMesh, MeshError> {
        let stale = match &self.manifold_cache {
            Some(cache) => cache.version != self.version,
            None => true,
        };
        if stale {
            debug!(version = self.version.0, "rebuilding manifold cache");
            let raw = crate::external::raw_from_tagged_mesh(self).0;
            let handle = engine
                .build(&raw)
                .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
            let rebuilt = engine
                .get_mesh(handle)
                .map_err(|e| MeshError::ManifoldEngineFailed { reason: e.to_string() })?;
            engine.delete(handle);
            self.manifold_cache = Some(ManifoldCache {
                version: self.version,
                mesh: rebuilt,
            });
        }
        Ok(&self.manifold_cache.as_ref().unwrap().mesh)
    }

    /// Compact the mesh: drop unreferenced vertices and renumber triangle
    /// indices. Used by operators that remove triangles in bulk (islands,
    /// internal-triangle removal) and would otherwise leave dangling
    /// positions behind.
    pub fn compact_vertices(&mut self) {
        let mut used = vec![false; self.positions.len()];
        for tri in &self.triangles {
            for &v in tri {
                used[v as usize] = true;
            }
        }
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut new_positions = Vec::new();
        for (old, &is_used) in used.iter().enumerate() {
            if is_used {
                remap[old] = new_positions.len() as u32;
                new_positions.push(self.positions[old]);
            }
        }
        for tri in &mut self.triangles {
            for v in tri.iter_mut() {
                *v = remap[*v as usize];
            }
        }
        self.vert_lookup.clear();
        for (idx, p) in new_positions.iter().enumerate() {
            self.vert_lookup.insert(vert_key(*p, self.weld_tolerance), VertIdx(idx as u32));
        }
        self.positions = new_positions;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_triangle_welds_shared_vertices() {
        let mut mesh = TaggedMesh::new();
        let p0 = Point3d::new(0.0, 0.0, 0.0);
        let p1 = Point3d::new(1.0, 0.0, 0.0);
        let p2 = Point3d::new(0.0, 1.0, 0.0);
        mesh.add_triangle("top", p0, p1, p2);
        mesh.add_triangle("top", p1, p2, Point3d::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn add_triangle_assigns_stable_face_ids() {
        let mut mesh = TaggedMesh::new();
        let (_, _) = mesh.add_triangle(
            "a",
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        );
        let (_, _) = mesh.add_triangle(
            "b",
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 0.0, 1.0),
        );
        assert_ne!(mesh.tri_face()[0], mesh.tri_face()[1]);
        assert_eq!(mesh.face_name().len(), 2);
    }

    #[test]
    fn deep_clone_matches_positions() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle(
            "a",
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        );
        let clone = mesh.deep_clone();
        assert_eq!(mesh.positions(), clone.positions());
    }

    #[test]
    fn free_then_get_mesh_is_idempotent_and_reusable() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle(
            "a",
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        );
        mesh.free();
        mesh.free();
        let mut engine = crate::manifold::MockManifoldEngine::new();
        let raw = mesh.get_mesh(&mut engine).unwrap();
        assert_eq!(raw.triangle_count(), 1);
    }

    #[test]
    fn compact_vertices_drops_unreferenced_positions() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle(
            "a",
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        );
        mesh.positions_mut().push(Point3d::new(9.0, 9.0, 9.0));
        mesh.touch();
        assert_eq!(mesh.vertex_count(), 4);
        mesh.compact_vertices();
        assert_eq!(mesh.vertex_count(), 3);
    }
}

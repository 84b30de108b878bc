//! §4.8 Repair Orchestrator: a fluent, chainable sequence over the
//! operator library, cancellable, caching the mesh's last manifoldized
//! form through the same lazy mechanism as [`crate::mesh::TaggedMesh::get_mesh`].

use mesh_types::{MeshError, Tolerances};

use crate::cancel::CancellationToken;
use crate::manifold::ManifoldEngine;
use crate::mesh::TaggedMesh;
use crate::ops::{
    collapse_tiny_triangles, flip_tiny_triangle_edges, merge_tiny_faces, remesh_uniform_length,
    remove_degenerate_triangles, remove_internal_triangles, remove_opposite_single_edge_faces,
    remove_small_islands, split_self_intersecting_triangles, CollapseConfig, EdgeFlipConfig, InternalConfig,
    IslandConfig, MergeFacesConfig, OppositeFaceConfig, RemeshConfig, SelfIntersectConfig,
};
use crate::ops::winding::fix_triangle_windings_by_adjacency;

/// Which operator ran and how many changes it made, recorded for callers
/// that want a per-step trace (the `debug` configuration option, §6).
#[derive(Debug, Clone)]
pub struct RepairStep {
    pub name: &'static str,
    pub changes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RepairOutcome {
    pub steps: Vec<RepairStep>,
    pub cancelled: bool,
}

impl RepairOutcome {
    pub fn total_changes(&self) -> usize {
        self.steps.iter().map(|s| s.changes).sum()
    }
}

/// Fluent, chainable wrapper over the operator library (§4.8). Each method
/// borrows the mesh mutably, runs one operator, records a [`RepairStep`],
/// and returns `self` so calls can be chained in any order the caller
/// wants; [`RepairPipeline::default_sequence`] runs the spec's standard
/// nine-step pipeline.
pub struct RepairPipeline<'a> {
    mesh: &'a mut TaggedMesh,
    cancel: CancellationToken,
    tol: Tolerances,
    outcome: RepairOutcome,
}

impl<'a> RepairPipeline<'a> {
    pub fn new(mesh: &'a mut TaggedMesh) -> Self {
        Self {
            mesh,
            cancel: CancellationToken::never(),
            tol: Tolerances::default(),
            outcome: RepairOutcome::default(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_tolerances(mut self, tol: Tolerances) -> Self {
        self.tol = tol;
        self
    }

    fn record(&mut self, name: &'static str, changes: usize) {
        self.outcome.steps.push(RepairStep { name, changes });
    }

    fn should_stop(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            self.outcome.cancelled = true;
            true
        } else {
            false
        }
    }

    pub fn remove_degenerate_triangles(mut self) -> Self {
        if self.should_stop() {
            return self;
        }
        let n = remove_degenerate_triangles(self.mesh, &self.tol);
        self.record("remove_degenerate_triangles", n);
        self
    }

    pub fn collapse_tiny_triangles(
        mut self,
        cfg: &CollapseConfig,
        engine: &mut dyn ManifoldEngine,
    ) -> Result<Self, MeshError> {
        if self.should_stop() {
            return Ok(self);
        }
        let n = collapse_tiny_triangles(self.mesh, cfg, engine)?;
        self.record("collapse_tiny_triangles", n);
        Ok(self)
    }

    pub fn split_self_intersecting_triangles(mut self, cfg: &SelfIntersectConfig) -> Result<Self, MeshError> {
        if self.should_stop() {
            return Ok(self);
        }
        let n = split_self_intersecting_triangles(self.mesh, cfg, &self.cancel, &self.tol)?;
        self.record("split_self_intersecting_triangles", n);
        Ok(self)
    }

    pub fn remove_internal_triangles(
        mut self,
        cfg: &InternalConfig,
        engine: &mut dyn ManifoldEngine,
    ) -> Result<Self, MeshError> {
        if self.should_stop() {
            return Ok(self);
        }
        let n = remove_internal_triangles(self.mesh, cfg, engine)?;
        self.record("remove_internal_triangles", n);
        Ok(self)
    }

    pub fn fix_triangle_windings_by_adjacency(mut self) -> Self {
        if self.should_stop() {
            return self;
        }
        let n = fix_triangle_windings_by_adjacency(self.mesh);
        self.record("fix_triangle_windings_by_adjacency", n);
        self
    }

    pub fn remove_small_islands(mut self, cfg: &IslandConfig) -> Self {
        if self.should_stop() {
            return self;
        }
        let n = remove_small_islands(self.mesh, cfg);
        self.record("remove_small_islands", n);
        self
    }

    pub fn flip_tiny_triangle_edges(mut self, cfg: &EdgeFlipConfig) -> Self {
        if self.should_stop() {
            return self;
        }
        let n = flip_tiny_triangle_edges(self.mesh, cfg);
        self.record("flip_tiny_triangle_edges", n);
        self
    }

    pub fn remesh_uniform_length(mut self, cfg: &RemeshConfig) -> Result<Self, MeshError> {
        if self.should_stop() {
            return Ok(self);
        }
        let n = remesh_uniform_length(self.mesh, cfg, &self.cancel)?;
        self.record("remesh_uniform_length", n);
        Ok(self)
    }

    pub fn remove_opposite_single_edge_faces(mut self, cfg: &OppositeFaceConfig) -> Self {
        if self.should_stop() {
            return self;
        }
        let n = remove_opposite_single_edge_faces(self.mesh, cfg);
        self.record("remove_opposite_single_edge_faces", n);
        self
    }

    pub fn merge_tiny_faces(mut self, cfg: &MergeFacesConfig) -> Self {
        if self.should_stop() {
            return self;
        }
        let n = merge_tiny_faces(self.mesh, cfg);
        self.record("merge_tiny_faces", n);
        self
    }

    pub fn finish(self) -> RepairOutcome {
        self.outcome
    }

    /// The standard nine-step pipeline (§4.8): degenerate cleanup, tiny-
    /// triangle collapse, self-intersection split, internal-triangle
    /// removal (manifold strategy, falling back to winding), a winding
    /// fix-up, small-island removal, tiny-edge flip, tiny-face merge, and a
    /// final winding fix-up.
    pub fn run_default_sequence(
        mesh: &'a mut TaggedMesh,
        engine: &mut dyn ManifoldEngine,
        cancel: CancellationToken,
        tol: Tolerances,
    ) -> Result<RepairOutcome, MeshError> {
        let pipeline = Self::new(mesh).with_cancellation(cancel).with_tolerances(tol);
        let internal_cfg = InternalConfig {
            fallback: crate::ops::InternalStrategy::WindingNumber,
            ..InternalConfig::default()
        };
        let pipeline = pipeline
            .remove_degenerate_triangles()
            .collapse_tiny_triangles(&CollapseConfig::default(), engine)?
            .split_self_intersecting_triangles(&SelfIntersectConfig::default())?
            .remove_internal_triangles(&internal_cfg, engine)?
            .fix_triangle_windings_by_adjacency()
            .remove_small_islands(&IslandConfig::default())
            .flip_tiny_triangle_edges(&EdgeFlipConfig::default())
            .merge_tiny_faces(&MergeFacesConfig::default())
            .fix_triangle_windings_by_adjacency();
        Ok(pipeline.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::MockManifoldEngine;
    use mesh_types::Point3d;

    #[test]
    fn default_sequence_runs_to_completion_on_simple_mesh() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let mut engine = MockManifoldEngine::new();
        let outcome =
            RepairPipeline::run_default_sequence(&mut mesh, &mut engine, CancellationToken::never(), Tolerances::default())
                .unwrap();
        assert!(!outcome.cancelled);
        assert_eq!(outcome.steps.len(), 9);
    }

    #[test]
    fn cancellation_stops_remaining_steps() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let token = CancellationToken::new();
        token.cancel();
        let mut engine = MockManifoldEngine::new();
        let outcome =
            RepairPipeline::run_default_sequence(&mut mesh, &mut engine, token, Tolerances::default()).unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.total_changes(), 0);
    }
}

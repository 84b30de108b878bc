//! Sheet-Metal Face Classifier, Neutral-Fiber Offsetter, Flat-Pattern
//! Unfolder, and Annotation Builder (§4.4-§4.7). Operates on a repaired
//! [`mesh_core::TaggedMesh`]; never mutates the caller's mesh in place — the
//! classifier and offsetter run on an internal clone so a caller can diff
//! repaired-vs-unfolded geometry.

pub mod annotate;
pub mod classifier;
pub mod offset;
pub mod types;
pub mod unfold;

pub use classifier::{classify, cylindrical_inside_map, ClassifierOptions, ClassifierResult};
pub use offset::offset_neutral_fiber;
pub use types::{BendAnnotations, BendCenterline, BendEdge, FlatFace, FlatPattern, Frame, Placement, PlacementStep};
pub use unfold::unfold_flat_pattern;

use mesh_core::topology::TopologyIndex;
use mesh_core::TaggedMesh;
use mesh_types::MeshError;

/// Run the full sheet-metal pipeline end to end (§4.4-§4.7): classify,
/// offset a clone of `mesh` to the neutral fiber, then unfold it.
///
/// `debug_placement_steps` mirrors the §6 configuration knob of the same
/// name: when set, [`FlatPattern::debug_steps`] records the placement BFS
/// order for diagnostics.
pub fn unfold_sheet_metal(mesh: &TaggedMesh, opts: &ClassifierOptions, debug_placement_steps: bool) -> Result<FlatPattern, MeshError> {
    let topo = TopologyIndex::build(mesh);
    let result = classify(mesh, &topo, opts)?;

    let mut working = mesh.deep_clone();
    offset_neutral_fiber(&mut working, &result.include_set, result.neutral_factor, result.thickness);

    let working_topo = TopologyIndex::build(&working);
    let inside_map = cylindrical_inside_map(&working, opts.radius_tolerance.max(1e-9));

    unfold_flat_pattern(
        &working,
        &working_topo,
        &result.include_set,
        &inside_map,
        result.thickness,
        result.neutral_factor,
        debug_placement_steps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{FaceMeta, Point3d, SheetSide, Vec3};

    /// Two parallel planar faces (a simple flat sheet with no bend) still
    /// classify and unfold into a one-component flat pattern.
    #[test]
    fn flat_sheet_unfolds_without_bends() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle(
            "top",
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(10.0, 0.0, 0.0),
            Point3d::new(0.0, 10.0, 0.0),
        );
        mesh.add_triangle(
            "bottom",
            Point3d::new(0.0, 0.0, -1.0),
            Point3d::new(10.0, 0.0, -1.0),
            Point3d::new(0.0, 10.0, -1.0),
        );
        let top = mesh.face_name().id_of("top").unwrap();
        let bottom = mesh.face_name().id_of("bottom").unwrap();
        mesh.face_meta_mut().insert(top, FaceMeta::planar().with_side(SheetSide::A));
        mesh.face_meta_mut().insert(bottom, FaceMeta::planar().with_side(SheetSide::B));

        let opts = ClassifierOptions {
            thickness: Some(1.0),
            ..ClassifierOptions::default()
        };
        let pattern = unfold_sheet_metal(&mesh, &opts, false).unwrap();
        assert!(!pattern.disconnected);
        assert_eq!(pattern.triangles.len(), 1);
        assert!((pattern.thickness - 1.0).abs() < 1e-9);
    }

    /// A quarter-cylinder bend between two planar flanges unfolds into one
    /// connected flat pattern with a single bend centerline.
    #[test]
    fn bent_bracket_unfolds_to_single_component_with_one_bend() {
        let mut mesh = TaggedMesh::new();
        let width = 3.0;
        mesh.add_triangle(
            "flange_a",
            Point3d::new(-5.0, 0.0, 0.0),
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(-5.0, width, 0.0),
        );
        mesh.add_triangle(
            "flange_a",
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.0, width, 0.0),
            Point3d::new(-5.0, width, 0.0),
        );

        let r = 2.0;
        let n = 6;
        for i in 0..n - 1 {
            let a0 = std::f64::consts::FRAC_PI_2 * (i as f64) / (n as f64 - 1.0);
            let a1 = std::f64::consts::FRAC_PI_2 * (i as f64 + 1.0) / (n as f64 - 1.0);
            let cx = 0.0;
            let cz = -r;
            let p00 = Point3d::new(cx + r * a0.sin(), 0.0, cz + r * a0.cos());
            let p01 = Point3d::new(cx + r * a0.sin(), width, cz + r * a0.cos());
            let p10 = Point3d::new(cx + r * a1.sin(), 0.0, cz + r * a1.cos());
            let p11 = Point3d::new(cx + r * a1.sin(), width, cz + r * a1.cos());
            mesh.add_triangle("bend", p00, p10, p01);
            mesh.add_triangle("bend", p10, p11, p01);
        }

        let end_angle = std::f64::consts::FRAC_PI_2;
        let ex = r * end_angle.sin();
        let ez = -r + r * end_angle.cos();
        mesh.add_triangle(
            "flange_b",
            Point3d::new(ex, 0.0, ez),
            Point3d::new(ex + 5.0, 0.0, ez),
            Point3d::new(ex, width, ez),
        );
        mesh.add_triangle(
            "flange_b",
            Point3d::new(ex + 5.0, 0.0, ez),
            Point3d::new(ex + 5.0, width, ez),
            Point3d::new(ex, width, ez),
        );

        let flange_a = mesh.face_name().id_of("flange_a").unwrap();
        let flange_b = mesh.face_name().id_of("flange_b").unwrap();
        let bend = mesh.face_name().id_of("bend").unwrap();
        mesh.face_meta_mut().insert(flange_a, FaceMeta::planar().with_side(SheetSide::A));
        mesh.face_meta_mut().insert(flange_b, FaceMeta::planar().with_side(SheetSide::A));
        mesh.face_meta_mut()
            .insert(bend, FaceMeta::cylindrical(Vec3::X, Point3d::new(0.0, 0.0, -r), r).with_side(SheetSide::A));

        let opts = ClassifierOptions {
            thickness: Some(1.0),
            strict_surface_type: false,
            ..ClassifierOptions::default()
        };
        let pattern = unfold_sheet_metal(&mesh, &opts, false).unwrap();
        assert!(!pattern.disconnected);
        assert_eq!(pattern.bend_annotations.centerlines.len(), 1);
    }
}

//! Integration test driving the L-bracket sheet-metal scenario (§8 S3)
//! through the full classify/offset/unfold pipeline.

use std::f64::consts::FRAC_PI_2;

use approx::assert_abs_diff_eq;
use mesh_harness::fixtures::l_bracket;
use sheet_metal::{unfold_sheet_metal, ClassifierOptions};

#[test]
fn l_bracket_flat_length_matches_bend_allowance() {
    let inside_radius = 3.0;
    let thickness = 2.0;
    let k = 0.44;
    let flange_depth = 5.0;
    let flange_width = 4.0;

    let mesh = l_bracket(inside_radius, thickness, flange_depth, flange_width, 24);

    let opts = ClassifierOptions {
        thickness: Some(thickness),
        neutral_factor: k,
        strict_surface_type: false,
        ..ClassifierOptions::default()
    };

    let pattern = unfold_sheet_metal(&mesh, &opts, false).unwrap();
    assert!(!pattern.disconnected);
    assert_eq!(pattern.bend_annotations.centerlines.len(), 1);

    let neutral_radius = inside_radius + k * thickness;
    let bend_allowance = FRAC_PI_2 * neutral_radius;
    let expected_length = flange_depth + bend_allowance + flange_depth;

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f32::MAX, f32::MIN, f32::MAX, f32::MIN);
    for p in &pattern.positions {
        min_x = min_x.min(p[0]);
        max_x = max_x.max(p[0]);
        min_y = min_y.min(p[1]);
        max_y = max_y.max(p[1]);
    }
    let width = (max_x - min_x) as f64;
    let height = (max_y - min_y) as f64;
    let (length, span) = if width >= height { (width, height) } else { (height, width) };

    assert_abs_diff_eq!(length, expected_length, epsilon = 1e-3);
    assert_abs_diff_eq!(span, flange_width, epsilon = 1e-3);
}

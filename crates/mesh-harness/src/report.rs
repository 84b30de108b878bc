//! Structured text summaries of a repair run and an unfold run, for
//! diagnostic output (ref. the teacher's `ModelReport`, retargeted from a
//! CAD feature tree to a [`RepairOutcome`]/[`FlatPattern`] pair).

use std::fmt;

use mesh_core::RepairOutcome;
use sheet_metal::FlatPattern;

#[derive(Debug, Clone)]
pub struct RepairStepEntry {
    pub name: String,
    pub changed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ModelReport {
    pub steps: Vec<RepairStepEntry>,
    pub total_changes: usize,
    pub final_vertex_count: usize,
    pub final_triangle_count: usize,
    pub flat_pattern_triangle_count: Option<usize>,
    pub flat_pattern_disconnected: Option<bool>,
}

impl ModelReport {
    pub fn from_outcome(outcome: &RepairOutcome, vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            steps: outcome
                .steps
                .iter()
                .map(|s| RepairStepEntry {
                    name: s.name.to_string(),
                    changed: s.changes,
                })
                .collect(),
            total_changes: outcome.total_changes(),
            final_vertex_count: vertex_count,
            final_triangle_count: triangle_count,
            flat_pattern_triangle_count: None,
            flat_pattern_disconnected: None,
        }
    }

    pub fn with_flat_pattern(mut self, pattern: &FlatPattern) -> Self {
        self.flat_pattern_triangle_count = Some(pattern.triangles.len());
        self.flat_pattern_disconnected = Some(pattern.disconnected);
        self
    }
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "repair pipeline: {} step(s), {} total change(s)", self.steps.len(), self.total_changes)?;
        for step in &self.steps {
            writeln!(f, "  - {}: {} change(s)", step.name, step.changed)?;
        }
        writeln!(f, "final mesh: {} vertices, {} triangles", self.final_vertex_count, self.final_triangle_count)?;
        if let Some(count) = self.flat_pattern_triangle_count {
            let disconnected = self.flat_pattern_disconnected.unwrap_or(false);
            writeln!(f, "flat pattern: {count} triangle(s), disconnected = {disconnected}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::orchestrator::RepairStep;

    #[test]
    fn report_totals_match_outcome() {
        let outcome = RepairOutcome {
            steps: vec![
                RepairStep {
                    name: "remove_degenerate_triangles",
                    changes: 2,
                },
                RepairStep {
                    name: "collapse_tiny_triangles",
                    changes: 0,
                },
            ],
            cancelled: false,
        };
        let report = ModelReport::from_outcome(&outcome, 10, 8);
        assert_eq!(report.total_changes, 2);
        assert_eq!(report.steps.len(), 2);
        let text = report.to_string();
        assert!(text.contains("remove_degenerate_triangles"));
    }
}

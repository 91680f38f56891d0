//! Apply one geometry operation across many meshes.

use rayon::prelude::*;
use tracing::{info, warn};

use geomopt_core::TriangleMesh;

use crate::operation::GeometryOperation;

/// Outcome of running a [`GeometryModifier`] over a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierReport {
    pub meshes_processed: usize,
    pub primitives_before: usize,
    pub primitives_after: usize,
    /// Index and message of every mesh the operation failed on. Failed
    /// meshes are left as they were.
    pub failures: Vec<(usize, String)>,
}

impl ModifierReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives a [`GeometryOperation`] over a collection of meshes in parallel.
#[derive(Debug, Clone)]
pub struct GeometryModifier {
    operation: Box<dyn GeometryOperation>,
}

impl GeometryModifier {
    pub fn new(operation: Box<dyn GeometryOperation>) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> &dyn GeometryOperation {
        self.operation.as_ref()
    }

    pub fn apply_all(&self, meshes: &mut [TriangleMesh]) -> ModifierReport {
        let primitives_before = meshes.iter().map(TriangleMesh::primitive_count).sum();

        let failures: Vec<(usize, String)> = meshes
            .par_iter_mut()
            .enumerate()
            .filter_map(|(i, mesh)| {
                self.operation
                    .apply(mesh)
                    .err()
                    .map(|e| (i, e.to_string()))
            })
            .collect();

        let report = ModifierReport {
            meshes_processed: meshes.len(),
            primitives_before,
            primitives_after: meshes.iter().map(TriangleMesh::primitive_count).sum(),
            failures,
        };

        for (i, message) in &report.failures {
            warn!(mesh = i, error = %message, operation = self.operation.class_name(), "Geometry operation failed");
        }
        info!(
            operation = self.operation.class_name(),
            meshes = report.meshes_processed,
            before = report.primitives_before,
            after = report.primitives_after,
            "Geometry modifier finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::*;
    use crate::ShortEdgeOp;

    #[test]
    fn test_apply_all() {
        let op = ShortEdgeOp::new()
            .with_sample_ratio(0.5)
            .with_max_feature(1.0);
        let modifier = GeometryModifier::new(Box::new(op));
        let mut meshes = vec![make_plane_grid(8), make_plane_grid(10), TriangleMesh::new()];

        let report = modifier.apply_all(&mut meshes);
        assert!(report.is_success());
        assert_eq!(report.meshes_processed, 3);
        assert_eq!(report.primitives_before, 98 + 162);
        assert!(report.primitives_after < report.primitives_before);
        assert_eq!(
            report.primitives_after,
            meshes.iter().map(|m| m.face_count()).sum::<usize>()
        );
    }

    #[test]
    fn test_failures_are_reported() {
        let modifier = GeometryModifier::new(Box::new(ShortEdgeOp::new()));
        let mut broken = make_single_triangle();
        broken.add_face([0, 1, 42]);
        let mut meshes = vec![make_plane_grid(4), broken];

        let report = modifier.apply_all(&mut meshes);
        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 1);
        assert!(report.failures[0].1.contains("42"));
        assert_eq!(meshes[1].face_count(), 2);
    }

    #[test]
    fn test_operation_access() {
        let modifier = GeometryModifier::new(Box::new(ShortEdgeOp::new()));
        assert_eq!(modifier.operation().class_name(), "ShortEdgeOp");
        let copy = modifier.clone();
        assert_eq!(copy.operation().class_name(), "ShortEdgeOp");
    }
}

//! Core traits for geomopt

use crate::{mesh::*, point::*};

/// Trait for objects with an axis-aligned bounding box
pub trait Bounded {
    /// Get the bounding box of the object as (min, max)
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Size of the bounding box along each axis
    fn extent(&self) -> Vector3f {
        let (min, max) = self.bounding_box();
        max - min
    }

    /// Smallest strictly positive bounding-box dimension.
    ///
    /// Flat geometry has a zero extent along its normal axis, so that axis is
    /// skipped. Returns `None` when every dimension is zero.
    fn min_extent(&self) -> Option<f32> {
        let extent = self.extent();
        extent
            .iter()
            .copied()
            .filter(|d| *d > 0.0 && d.is_finite())
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl Bounded for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.vertices.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for vertex in &self.vertices {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_box_and_extent() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, 0.0, 2.0),
                Point3f::new(3.0, 4.0, 2.5),
                Point3f::new(0.0, -2.0, 3.0),
            ],
            vec![[0, 1, 2]],
        );
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, Point3f::new(-1.0, -2.0, 2.0));
        assert_eq!(max, Point3f::new(3.0, 4.0, 3.0));
        assert_eq!(mesh.extent(), Vector3f::new(4.0, 6.0, 1.0));
        assert_relative_eq!(mesh.min_extent().unwrap(), 1.0);
    }

    #[test]
    fn test_min_extent_skips_flat_axis() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(4.0, 0.0, 0.0),
                Point3f::new(0.0, 2.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        assert_relative_eq!(mesh.min_extent().unwrap(), 2.0);
    }

    #[test]
    fn test_min_extent_degenerate() {
        let mesh = TriangleMesh::from_vertices_and_faces(vec![Point3f::new(1.0, 1.0, 1.0); 3], vec![]);
        assert!(mesh.min_extent().is_none());
        assert!(TriangleMesh::new().min_extent().is_none());
    }
}

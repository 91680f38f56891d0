//! Smooth vertex normals

use geomopt_core::{TriangleMesh, Vector3f};

/// Replace the mesh normals with area-weighted averages of the adjacent face
/// normals. Vertices without usable faces get `+Z`.
pub fn smooth_normals(mesh: &mut TriangleMesh) {
    let mut accum = vec![Vector3f::zeros(); mesh.vertices.len()];

    for (face, weighted) in mesh.faces.iter().zip(mesh.calculate_face_normals()) {
        if !weighted.iter().all(|x| x.is_finite()) {
            continue;
        }
        for &vi in face {
            accum[vi] += weighted;
        }
    }

    let normals = accum
        .into_iter()
        .map(|n| match n.try_normalize(f32::EPSILON) {
            Some(unit) => unit,
            None => Vector3f::z(),
        })
        .collect();
    mesh.set_normals(normals);
}

//! OBJ format support

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use obj::ObjData;
use tracing::debug;

use crate::error::IoError;
use crate::{MeshReader, MeshWriter};
use geomopt_core::{Point3f, Result, TriangleMesh, Vector3f};

pub struct ObjReader;
pub struct ObjWriter;

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path.as_ref())?;
        read_obj_from(BufReader::new(file))
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        write_obj_to(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Parse OBJ data into a triangle mesh.
///
/// Polygons with more than three corners are fan-triangulated. Vertex
/// normals are kept only when every corner of a vertex names the same `vn`.
pub fn read_obj_from<R: Read>(input: R) -> Result<TriangleMesh> {
    let data = ObjData::load_buf(input).map_err(|e| IoError::ParseError {
        message: e.to_string(),
    })?;

    let vertices: Vec<Point3f> = data
        .position
        .iter()
        .map(|p| Point3f::new(p[0], p[1], p[2]))
        .collect();

    let mut faces = Vec::new();
    let mut vertex_normal: HashMap<usize, usize> = HashMap::new();
    let mut normals_consistent = !data.normal.is_empty();

    for object in &data.objects {
        for group in &object.groups {
            for poly in &group.polys {
                let corners = &poly.0;
                if corners.len() < 3 {
                    continue;
                }
                for corner in corners {
                    if corner.0 >= vertices.len() {
                        return Err(IoError::ParseError {
                            message: format!(
                                "face references vertex {} but only {} are defined",
                                corner.0 + 1,
                                vertices.len()
                            ),
                        }
                        .into());
                    }
                    match corner.2 {
                        Some(n) if n < data.normal.len() => {
                            if *vertex_normal.entry(corner.0).or_insert(n) != n {
                                normals_consistent = false;
                            }
                        }
                        _ => normals_consistent = false,
                    }
                }
                for k in 1..corners.len() - 1 {
                    faces.push([corners[0].0, corners[k].0, corners[k + 1].0]);
                }
            }
        }
    }

    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    if normals_consistent && vertex_normal.len() == mesh.vertex_count() {
        let normals = (0..mesh.vertex_count())
            .map(|v| {
                let n = data.normal[vertex_normal[&v]];
                Vector3f::new(n[0], n[1], n[2])
            })
            .collect();
        mesh.set_normals(normals);
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        normals = mesh.normals.is_some(),
        "Read OBJ mesh"
    );
    Ok(mesh)
}

/// Serialize a triangle mesh as OBJ.
///
/// Normals are written per vertex and share the vertex numbering, so faces
/// come out as `f a//a b//b c//c`.
pub fn write_obj_to<W: Write>(mesh: &TriangleMesh, out: &mut W) -> Result<()> {
    writeln!(out, "# {} vertices, {} faces", mesh.vertex_count(), mesh.face_count())?;
    for p in &mesh.vertices {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }

    let normals = mesh
        .normals
        .as_ref()
        .filter(|ns| ns.len() == mesh.vertex_count());
    if let Some(normals) = normals {
        for n in normals {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    for face in &mesh.faces {
        let [a, b, c] = face.map(|v| v + 1);
        if normals.is_some() {
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(out, "f {a} {b} {c}")?;
        }
    }
    Ok(())
}

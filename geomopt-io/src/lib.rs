//! I/O for meshes and decimation settings
//!
//! Meshes are read and written as Wavefront OBJ. Short edge decimation
//! settings are stored as JSON documents matching [`ShortEdgeConfig`].

pub mod error;
pub mod obj;

pub use error::*;
pub use obj::{read_obj_from, write_obj_to, ObjReader, ObjWriter};

use std::fs;
use std::path::Path;

use geomopt_core::{Error, Result, TriangleMesh};
use geomopt_simplification::ShortEdgeConfig;
use tracing::debug;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => ObjReader::read_mesh(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => ObjWriter::write_mesh(mesh, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Load decimation settings from a JSON file. Missing fields take their
/// default values.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ShortEdgeConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = serde_json::from_str(&text)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "Loaded decimation config");
    Ok(config)
}

/// Write decimation settings as pretty-printed JSON.
pub fn save_config<P: AsRef<Path>>(config: &ShortEdgeConfig, path: P) -> Result<()> {
    let text = serde_json::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    fs::write(path, text)?;
    Ok(())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
}

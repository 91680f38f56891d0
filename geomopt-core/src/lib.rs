//! Core data structures and traits for geomopt
//!
//! This crate provides the mesh container that geometry operations act on,
//! the point and vector aliases, bounding-box queries and the shared error type.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// Common result type for geomopt operations
pub type Result<T> = std::result::Result<T, Error>;

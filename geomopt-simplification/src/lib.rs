//! Mesh reduction operations
//!
//! This crate provides geometry operations that reduce mesh complexity while
//! preserving important features:
//! - Short edge decimation with a pluggable continuation policy
//! - Smooth normal regeneration and triangle re-stripping
//! - Batch application and name-based creation of operations

pub mod operation;
pub mod short_edge;
pub mod config;
pub mod stats;
pub mod smoothing;
pub mod tristrip;
pub mod modifier;
pub mod registry;

mod half_edge;

#[cfg(test)]
mod test_meshes;

pub use operation::*;
pub use short_edge::*;
pub use config::*;
pub use stats::*;
pub use smoothing::*;
pub use tristrip::*;
pub use modifier::*;
pub use registry::*;

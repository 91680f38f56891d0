//! Polymorphic geometry operations
//!
//! A [`GeometryOperation`] is a functor applied to one mesh at a time. Trait
//! objects can be duplicated through [`GeometryOperation::clone_operation`]
//! and identified at runtime by class and library name, which is what the
//! [`OperationRegistry`](crate::OperationRegistry) builds on.

use std::fmt::Debug;
use geomopt_core::{Result, TriangleMesh};

/// How much of an operation is duplicated when it is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyOp {
    /// Share attached callbacks with the source operation.
    #[default]
    Shallow,
    /// Ask attached callbacks for an independent duplicate where they support it.
    Deep,
}

/// An operation that modifies a mesh in place.
pub trait GeometryOperation: Send + Sync + Debug {
    /// Apply the operation to `mesh`, returning the same mesh.
    fn apply<'a>(&self, mesh: &'a mut TriangleMesh) -> Result<&'a mut TriangleMesh>;

    /// Duplicate this operation behind a fresh trait object.
    fn clone_operation(&self) -> Box<dyn GeometryOperation>;

    /// Runtime type name, e.g. `"ShortEdgeOp"`.
    fn class_name(&self) -> &'static str;

    /// Name of the library that defines the operation.
    fn library_name(&self) -> &'static str {
        "geomopt"
    }
}

impl Clone for Box<dyn GeometryOperation> {
    fn clone(&self) -> Self {
        self.clone_operation()
    }
}

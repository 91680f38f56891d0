//! Name-based lookup and cloning of geometry operations
//!
//! Generic tools (the CLI, batch drivers) create operations by class name
//! without static knowledge of their types. Each registered prototype is
//! cloned on request.

use std::collections::HashMap;

use geomopt_core::{Error, Result};

use crate::operation::GeometryOperation;
use crate::short_edge::ShortEdgeOp;

/// Registry of prototype operations keyed by class name.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    prototypes: HashMap<String, Box<dyn GeometryOperation>>,
}

impl OperationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every operation this crate defines
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ShortEdgeOp::new()));
        registry
    }

    /// Register a prototype under its class name, replacing any previous one.
    pub fn register(&mut self, prototype: Box<dyn GeometryOperation>) {
        self.prototypes
            .insert(prototype.class_name().to_string(), prototype);
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.prototypes.contains_key(class_name)
    }

    /// Fresh clone of the prototype registered as `class_name`.
    pub fn create(&self, class_name: &str) -> Result<Box<dyn GeometryOperation>> {
        self.prototypes
            .get(class_name)
            .map(|p| p.clone_operation())
            .ok_or_else(|| Error::Unsupported(format!("unknown geometry operation: {}", class_name)))
    }

    /// Registered class names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.prototypes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomopt_core::TriangleMesh;

    #[derive(Debug, Clone)]
    struct Identity;

    impl GeometryOperation for Identity {
        fn apply<'a>(&self, mesh: &'a mut TriangleMesh) -> Result<&'a mut TriangleMesh> {
            Ok(mesh)
        }

        fn clone_operation(&self) -> Box<dyn GeometryOperation> {
            Box::new(self.clone())
        }

        fn class_name(&self) -> &'static str {
            "Identity"
        }
    }

    #[test]
    fn test_defaults() {
        let registry = OperationRegistry::with_defaults();
        assert!(registry.contains("ShortEdgeOp"));
        let op = registry.create("ShortEdgeOp").unwrap();
        assert_eq!(op.class_name(), "ShortEdgeOp");
        assert_eq!(op.library_name(), "geomopt");
    }

    #[test]
    fn test_unknown_operation() {
        let registry = OperationRegistry::new();
        let err = registry.create("Missing").unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_register_and_list() {
        let mut registry = OperationRegistry::with_defaults();
        registry.register(Box::new(Identity));
        assert_eq!(registry.names(), vec!["Identity", "ShortEdgeOp"]);

        let mut mesh = TriangleMesh::new();
        let op = registry.create("Identity").unwrap();
        assert!(op.apply(&mut mesh).is_ok());
    }

    #[test]
    fn test_prototype_settings_are_cloned() {
        let mut registry = OperationRegistry::new();
        registry.register(Box::new(ShortEdgeOp::new().with_min_primitives(12)));
        let op = registry.create("ShortEdgeOp").unwrap();
        assert!(format!("{:?}", op).contains("min_prim: 12"));
    }
}

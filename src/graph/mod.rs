//! Module identifiers and the dependency-graph registry the engine reads from
//!
//! - [`module_id`]: `name@version` identifiers and `name@requirement` dependency specifiers
//! - [`registry`]: `ModuleRegistry` trait plus an in-memory implementation

pub mod module_id;
pub mod registry;

pub use module_id::{DependencySpec, ModuleId};
pub use registry::{DependencyGraph, InMemoryRegistry, ModuleRegistry, RegistrySnapshot, ResolvedModule};

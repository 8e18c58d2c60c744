//! Version resolution and upgrade engine
//!
//! - [`version`]: version model, ranges and version sources
//! - [`graph`]: module identifiers and the dependency-graph registry
//! - [`resolver`]: conflict detection and resolution
//! - [`upgrade`]: upgrade planning and execution

pub mod config;
pub mod graph;
pub mod logging;
pub mod resolver;
pub mod upgrade;
pub mod version;

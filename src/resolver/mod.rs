//! Version conflict detection and resolution

pub mod conflict;

pub use conflict::{
    Conflict, ConflictResolution, ConflictResolver, ConflictStrategy, ResolutionKind,
};

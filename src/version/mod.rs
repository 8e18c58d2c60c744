//! Version model and version sources
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   Source    │     │   Semver    │
//! │  (fetch)    │     │ (parse/cmp) │
//! └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │   Sources   │     │    Range    │
//! │   (npm)     │     │ (satisfies) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: `Version` parsing and total ordering
//! - [`range`]: Single-operator range expressions and `satisfies`
//! - [`source`]: `VersionSource` trait for fetching published versions
//! - [`sources`]: Concrete version sources (npm)
//! - [`error`]: Error types for parsing, registries and the engine

pub mod error;
pub mod range;
pub mod semver;
pub mod source;
pub mod sources;

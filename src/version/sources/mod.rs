//! Concrete version sources

pub mod npm;

pub use npm::NpmVersionSource;

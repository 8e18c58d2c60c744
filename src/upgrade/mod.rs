//! Upgrade planning: candidate selection, breaking-change policy and batch walks

pub mod planner;
pub mod types;

pub use planner::{UpgradePlanner, find_compatible_upgrade, is_breaking_change, is_valid_upgrade};
pub use types::{UpgradeOptions, UpgradePreview, UpgradeResult, UpgradeStatus, UpgradeStrategy};

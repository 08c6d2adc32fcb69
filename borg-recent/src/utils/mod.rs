//! Utility modules for borg-recent.

pub mod errors;
pub mod logger;
pub mod paths;

pub use errors::{RecentError, Result};

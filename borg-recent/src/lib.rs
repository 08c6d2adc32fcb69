//! borg-recent library
//!
//! Finds the Borg repositories under a root directory, the most recent
//! archive of each, and the most recent database dump inside that archive.

pub mod api;
pub mod borg;
pub mod config;
pub mod daemon;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{collect_recent, Pipeline, RecentEntry};
pub use utils::errors::RecentError;
pub type Result<T> = std::result::Result<T, RecentError>;

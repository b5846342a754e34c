//! Site Index Cache - Read-through directory cache for the district Site Index
//!
//! Serves the public directory listing through a two-tier cache (in-process
//! memory, then a shared remote store) with pattern-based invalidation fanned
//! out on every write.

pub mod api;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod remote;
pub mod repo;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use directory::DirectoryService;
pub use tasks::spawn_sweep_task;

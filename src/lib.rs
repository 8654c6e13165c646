//! MoviesHound: search many movie index sites at once.
//!
//! This crate is the application shell around [`hound_search`]:
//! configuration, on-disk registry persistence, directory layout, and the
//! [`HoundApp`] facade used by the `hound` binary.
//!
//! # Architecture
//!
//! - **Config**: `config.toml` with `[search]`, `[discovery]` and `[registry]` sections
//! - **Store**: the site registry as a versioned JSON file, written atomically
//! - **App**: loads the registry (or defaults), optionally syncs it, and
//!   runs queries through the orchestrator

pub mod app;
pub mod config;
pub mod error;
pub mod hound_dirs;
pub mod store;

pub use app::HoundApp;
pub use config::{HoundConfig, RegistryConfig};
pub use error::{HoundError, Result};
pub use store::JsonFileStore;

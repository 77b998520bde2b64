//! Core utilities and types shared across all Brownaming crates

pub mod config;
pub mod error;
pub mod system;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{BrownamingError, BrownamingResult};

pub use types::{TaxonId, CELLULAR_ORGANISMS};

pub use system::{
    brownaming_home, default_config_path, default_runs_dir, generate_run_id, resolve_local_db,
    run_dir,
};

/// Version information for the Brownaming project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

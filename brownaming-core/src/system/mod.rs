pub mod paths;

// Re-export commonly used functions
pub use paths::{
    brownaming_home, default_config_path, default_runs_dir, generate_run_id,
    resolve_local_db, run_dir, LOCAL_DB_ENV,
};

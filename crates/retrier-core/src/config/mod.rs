//! Retry policy configuration loading

mod loader;

pub use loader::{PolicyLoader, ENV_LOG_THRESHOLD, ENV_MAX_ATTEMPTS, POLICY_FILE_NAME};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LpError;

/// Buffer size used by the file-backed result writers.
pub const WRITE_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Default number of worker threads for a job.
pub const DEFAULT_THREAD_NUM: usize = 4;

/// Default bound on the number of supersteps before a job is aborted.
pub const DEFAULT_MAX_SUPERSTEPS: u64 = 10_000;

/// Configuration of a BSP job.
///
/// # Fields
///
/// * `thread_num` - Number of worker threads computing vertices in parallel.
/// * `max_supersteps` - Upper bound on executed supersteps. A job that has not
///   reached its fixed point when the bound is hit is aborted. `None` removes
///   the bound.
/// * `show_progress` - Draw a spinner on stderr while supersteps run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BspConfig {
    pub thread_num: usize,
    pub max_supersteps: Option<u64>,
    pub show_progress: bool,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            thread_num: DEFAULT_THREAD_NUM,
            max_supersteps: Some(DEFAULT_MAX_SUPERSTEPS),
            show_progress: false,
        }
    }
}

impl BspConfig {
    /// Parses a configuration from a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LpError> {
        let config: BspConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, LpError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Checks the configuration at job-assembly time.
    ///
    /// # Errors
    ///
    /// Returns [`LpError::InvalidConfig`] when no worker thread is requested or
    /// when the superstep bound would not even allow superstep 0 to run.
    pub fn validate(&self) -> Result<(), LpError> {
        if self.thread_num == 0 {
            return Err(LpError::invalid_config("thread_num must be at least 1"));
        }
        if self.max_supersteps == Some(0) {
            return Err(LpError::invalid_config("max_supersteps must be at least 1"));
        }
        Ok(())
    }
}

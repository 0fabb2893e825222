use thiserror::Error;

/// Error type shared by graph assembly, job execution and result export.
///
/// Vertex computations themselves never fail; everything here is raised either
/// while a job is being assembled or by the runtime around it.
#[derive(Debug, Error)]
pub enum LpError {
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Edge references unknown vertex {vertex_id}")]
    UnknownVertex { vertex_id: u64 },

    #[error("Vertex {vertex_id} is declared more than once")]
    DuplicateVertex { vertex_id: u64 },

    #[error("Job aborted: no fixed point after {limit} supersteps")]
    SuperstepLimit { limit: u64 },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl LpError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        LpError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

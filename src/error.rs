use thiserror::Error;

#[derive(Debug, Error)]
pub enum RigError {
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("motion sampler is already running")]
    SamplerAlreadyRunning,

    #[error("motion source was lost when the sampler thread failed")]
    SamplerSourceLost,

    #[error("failed to spawn motion sampler thread: {0}")]
    SamplerThread(#[source] std::io::Error),

    #[error("event loop error: {0}")]
    EventLoop(String),
}

pub type Result<T> = std::result::Result<T, RigError>;

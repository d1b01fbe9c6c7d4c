use thiserror::Error;

/// Failure reported by the host's tracing facility.
#[derive(Debug, Clone, Error)]
#[error("host refused {action}: {reason}")]
pub struct HostError {
    pub action: &'static str,
    pub reason: String,
}

impl HostError {
    pub fn new(action: &'static str, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("invalid breakpoint spec `{spec}`: {reason}")]
    InvalidSpec { spec: String, reason: &'static str },

    #[error("unresolved owner `{segment}` in `{spec}`")]
    UnresolvedOwner { spec: String, segment: String },

    #[error("unresolved method `{method}` in `{spec}`")]
    UnresolvedMethod { spec: String, method: String },

    #[error("line {line} is outside the source ({len} lines)")]
    OutOfRangeLine { line: usize, len: usize },

    #[error("receiver `{0}` has no known owning type")]
    MissingReceiverType(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

pub type Result<T> = std::result::Result<T, TracerError>;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeterError {
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
    #[error("invalid meter configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MeterError>;

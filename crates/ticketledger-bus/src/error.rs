use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to publish event: {0}")]
    Publish(String),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("handler failed: {0}")]
    Handler(String),

    #[error("unknown partition {0}")]
    UnknownPartition(usize),
}

pub type BusResult<T> = Result<T, BusError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Network shape mismatch: expected {expected}, got {actual}")]
    NetworkShape { expected: usize, actual: usize },

    #[error("Network needs at least an input and an output layer, got {0} layer sizes")]
    NetworkTopology(usize),

    #[error("Malformed persisted state: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NemascreenError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0} is an improper well string")]
    InvalidWell(String),

    #[error("{0} is an improper tile string")]
    InvalidTile(String),

    #[error("Experiment plate {0} already exists")]
    PlateExists(i64),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NemascreenError>;

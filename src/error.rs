use std::io;
use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("bad request: {0}")]
    Validation(String),
    #[error("unable to interact with integration: {0}")]
    Integration(String),
    #[error("invalid number for field '{field}': {source}")]
    InvalidNumber {
        field: String,
        #[source]
        source: ParseIntError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

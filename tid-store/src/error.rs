use std::path::PathBuf;
use thiserror::Error;

use crate::time::TimeError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Constraint error: {0}")]
    Constraint(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Post {0} not found")]
    NotFound(i64),

    #[error("Media error: {}: {source}", path.display())]
    Media {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        StoreError::Config(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

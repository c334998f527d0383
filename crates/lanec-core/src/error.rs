use thiserror::Error;

use std::result;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed IR: {0}")]
    MalformedIr(String),
    #[error("Optimization error: {0}")]
    Optimization(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}

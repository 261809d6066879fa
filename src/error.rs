//! Errors a request handler can end in, and the status each maps to.

use std::io;

use thiserror::Error;

use crate::http::multipart::MultipartError;
use crate::http::parser::ParseError;
use crate::http::response::StatusCode;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Protocol(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Framing(#[from] MultipartError),
    #[error("Upload limit reached: {current} of {max} files stored")]
    QuotaExceeded { current: usize, max: usize },
    #[error("Invalid username or password")]
    AuthFailure,
    #[error("{0} not found")]
    NotFound(String),
    #[error("Method {0} not allowed")]
    MethodNotAllowed(&'static str),
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Protocol(_) | ServerError::Parse(_) => StatusCode::BadRequest,
            ServerError::InvalidFileName(_) => StatusCode::BadRequest,
            ServerError::AuthFailure => StatusCode::Unauthorized,
            ServerError::QuotaExceeded { .. } => StatusCode::Forbidden,
            ServerError::NotFound(_) => StatusCode::NotFound,
            ServerError::MethodNotAllowed(_) => StatusCode::MethodNotAllowed,
            ServerError::Framing(_) | ServerError::Io(_) => StatusCode::InternalServerError,
        }
    }
}

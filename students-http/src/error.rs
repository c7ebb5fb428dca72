use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use students_bridge::Error as BridgeError;

use crate::wrappers::ErrorInfo;

// Error
#[derive(Debug)]
pub enum Error {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<BridgeError> for Error {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::NotFound(_) => Error::NotFound(error.to_string()),
            BridgeError::Validation(_) | BridgeError::InvalidId(_) => {
                Error::BadRequest(error.to_string())
            }
            _ => Error::Internal(error.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Error::NotFound(error) => (StatusCode::NOT_FOUND, error),
            Error::BadRequest(error) => (StatusCode::BAD_REQUEST, error),
            Error::Internal(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error)
            }
        };
        (status, Json(ErrorInfo::new(error))).into_response()
    }
}

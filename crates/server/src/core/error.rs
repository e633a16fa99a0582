use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::core::auth::token::TokenError;

/// A single rejected request field, reported in the `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth Errors
    #[error("Invalid email or password!")]
    LoginFail,
    #[error("No token was given, authorization is denied!")]
    AuthFailNoToken,
    #[error("The given token is not Valid!")]
    AuthFailInvalidToken(#[source] TokenError),
    #[error("Auth context missing")]
    AuthFailCtxNotInRequestExt,
    #[error("You are not authorized to modify this {resource}!")]
    NotOwner { resource: &'static str },

    // Model Errors
    #[error("This email is already being used with another account!")]
    DuplicateEmail,
    #[error("No {resource} were found!")]
    NotFound { resource: &'static str },

    // Generic
    #[error("request validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::LoginFail | Error::AuthFailNoToken | Error::AuthFailInvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            Error::NotOwner { .. } => StatusCode::FORBIDDEN,
            // Missing documents are reported as 400, as existing clients expect.
            Error::DuplicateEmail
            | Error::NotFound { .. }
            | Error::Validation(_)
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::AuthFailCtxNotInRequestExt | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Error::Validation(errors) => json!({ "errors": errors }),
            Error::DuplicateEmail | Error::LoginFail => {
                json!({ "errors": [{ "msg": self.to_string() }] })
            }
            Error::AuthFailCtxNotInRequestExt | Error::Internal(_) => {
                error!("Internal error: {}", self);
                json!({ "msg": "There is a server side error, please try again later!" })
            }
            _ => json!({ "msg": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(format!("{:#}", err))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Internal(format!("database: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(format!("document encoding: {}", err))
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Internal(format!("password hashing: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Internal(format!("token signing: {}", err))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("blocking task: {}", err))
    }
}

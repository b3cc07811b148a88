//! Error types for agenda-web
//!
//! Form handlers turn most errors into a flash message and a redirect (see
//! [`WebError::user_message`]). Whatever escapes a handler is rendered as a
//! plain HTML error page.

use agenda_common::Error as CommonError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::views;

/// Web layer error type
#[derive(Debug, Error)]
pub enum WebError {
    /// agenda-common error (database, validation, duplicates)
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Session store failure
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Malformed or oversized multipart body
    #[error("Upload error: {0}")]
    Multipart(#[from] MultipartError),

    /// Photo storage I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Uploaded file is not an accepted image type
    #[error("Unsupported photo format")]
    UnsupportedPhoto,

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl WebError {
    /// Text shown to the user in a flash message
    pub fn user_message(&self) -> String {
        match self {
            WebError::Common(CommonError::InvalidInput(msg)) => msg.clone(),
            WebError::Common(CommonError::Duplicate(column)) => match column.as_str() {
                "email" => "Já existe um contato com este email.".to_string(),
                "cpf" => "Já existe um contato com este CPF.".to_string(),
                _ => "Este contato já está cadastrado.".to_string(),
            },
            WebError::Common(CommonError::NotFound(_)) | WebError::NotFound(_) => {
                "Contato não encontrado.".to_string()
            }
            WebError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "A foto excede o tamanho máximo permitido.".to_string()
            }
            WebError::Multipart(_) => "Não foi possível ler o formulário enviado.".to_string(),
            WebError::UnsupportedPhoto => {
                "A foto deve ser uma imagem JPEG, PNG, GIF ou WebP.".to_string()
            }
            WebError::Common(_) | WebError::Session(_) | WebError::Io(_) => {
                "Erro interno. Tente novamente mais tarde.".to_string()
            }
        }
    }

    /// Log at a level matching who caused the error
    pub fn log(&self) {
        match self {
            WebError::Common(e) if e.is_user_error() => warn!("Rejected input: {}", self),
            WebError::UnsupportedPhoto | WebError::NotFound(_) => warn!("{}", self),
            WebError::Multipart(_) => warn!("{}", self),
            _ => error!("{}", self),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) | WebError::Common(CommonError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            WebError::Common(CommonError::InvalidInput(_))
            | WebError::Common(CommonError::Duplicate(_))
            | WebError::UnsupportedPhoto => StatusCode::BAD_REQUEST,
            WebError::Multipart(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        (status, views::error_page(status, &self.user_message())).into_response()
    }
}

/// Result type for page handlers
pub type WebResult<T> = Result<T, WebError>;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::model::Message;
use crate::store::StoreError;

/// Errors surfaced by the HTTP layer. Every variant renders as
/// `{ "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Employee already exists")]
    AlreadyExists,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Employee not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AlreadyExists | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(msg) = self {
            tracing::error!(error = %msg, "request failed");
        }
        HttpResponse::build(self.status_code()).json(Message::new(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn renders_message_body() {
        let res = ApiError::NotFound.error_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(res.into_body()).await.unwrap();
        let message: Message = serde_json::from_slice(&body).unwrap();
        assert_eq!(message, Message::new("Employee not found"));
    }

    #[test]
    fn store_errors_become_internal_with_raw_text() {
        let err = ApiError::from(StoreError::Backend("DB Error".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "DB Error");
    }

    #[test]
    fn duplicate_maps_to_bad_request() {
        assert_eq!(ApiError::AlreadyExists.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AlreadyExists.to_string(), "Employee already exists");
    }
}

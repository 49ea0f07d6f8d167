/// HTTP-facing error taxonomy.
/// Every store failure is mapped here; response bodies are always `{"message": ...}`.
use crate::db::models::MessageResponse;
use crate::db::StoreError;
use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    Conflict,

    #[error("User not found")]
    NotFound,

    #[error("Wrong password")]
    Unauthorized,

    #[error("Database unavailable")]
    StoreUnavailable,

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(reason) => ApiError::Validation(reason),
            StoreError::AlreadyExists => ApiError::Conflict,
            StoreError::NotFound => ApiError::NotFound,
            StoreError::WrongPassword => ApiError::Unauthorized,
            StoreError::Unavailable(reason) => {
                log::warn!("Store unavailable: {}", reason);
                ApiError::StoreUnavailable
            }
            StoreError::Internal(reason) => {
                log::error!("Store error: {}", reason);
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageResponse::new(self.to_string()))
    }
}

/// Malformed JSON bodies become a 400 with the usual message shape
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    log::debug!("Rejected JSON body: {}", err);
    ApiError::Validation(format!("Invalid JSON body: {}", err)).into()
}

pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    log::debug!("Rejected query string: {}", err);
    ApiError::Validation(format!("Invalid query string: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let cases = [
            (StoreError::Invalid("empty".into()), StatusCode::BAD_REQUEST),
            (StoreError::AlreadyExists, StatusCode::CONFLICT),
            (StoreError::NotFound, StatusCode::NOT_FOUND),
            (StoreError::WrongPassword, StatusCode::UNAUTHORIZED),
            (
                StoreError::Unavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                StoreError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (store_err, status) in cases {
            assert_eq!(ApiError::from(store_err).status_code(), status);
        }
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = ApiError::from(StoreError::Internal("disk /dev/sda1 corrupted".into()));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[actix_web::test]
    async fn test_error_response_body() {
        let resp = ApiError::Conflict.error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"message": "User already exists"}));
    }
}

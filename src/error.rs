use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Internal server error while saving the review.")]
    StoreWrite(#[source] StoreError),

    #[error("Internal server error while loading reviews.")]
    StoreRead(#[source] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl ApiError {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation(e) => Some(e.code()),
            ApiError::MalformedPayload(_) => Some("MALFORMED_PAYLOAD"),
            ApiError::StoreWrite(_) | ApiError::StoreRead(_) => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreWrite(_) | ApiError::StoreRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            code: self.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(ValidationError::ForbiddenContent).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::MalformedPayload("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::StoreRead(StoreError::ReadFailed("gone".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_store_errors_hide_details() {
        let err = ApiError::StoreWrite(StoreError::WriteFailed("disk I/O error at /var/db".into()));
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "Internal server error while saving the review.");
        assert!(json.get("code").is_none());
    }

    #[actix_web::test]
    async fn test_validation_error_body() {
        let err = ApiError::from(ValidationError::MissingField(vec!["email"]));
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["code"], "MISSING_FIELD");
        assert_eq!(json["error"], "Text, rating and email are required (missing: email)");
    }
}

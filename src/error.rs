//! API error types and their HTTP mapping.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::content::ContentError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the JSON endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Missing OPENAI_API_KEY on server.")]
    MissingApiKey,

    #[error("{0}")]
    NotConfigured(String),

    #[error("OpenAI error")]
    Provider(String),

    #[error("Upstream content service error")]
    Upstream(String),

    #[error("Template error")]
    Template(#[from] tera::Error),

    #[error("Server error")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    fn detail(&self) -> Option<String> {
        match self {
            ApiError::Provider(detail) | ApiError::Upstream(detail) | ApiError::Internal(detail) => {
                Some(detail.clone())
            }
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::MissingApiKey
            | ApiError::NotConfigured(_)
            | ApiError::Provider(_)
            | ApiError::Template(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Template(e) = self {
            log::error!("Template error: {:?}", e);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            detail: self.detail(),
        })
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes_follow_fault_side() {
        assert_eq!(
            ApiError::InvalidRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::MissingApiKey.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Upstream("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[actix_web::test]
    async fn provider_error_carries_raw_detail() {
        let response = ApiError::Provider("{\"error\":{\"code\":\"boom\"}}".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "OpenAI error");
        assert_eq!(json["detail"], "{\"error\":{\"code\":\"boom\"}}");
    }

    #[actix_web::test]
    async fn missing_key_body_has_no_detail() {
        let response = ApiError::MissingApiKey.error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Missing OPENAI_API_KEY on server.");
        assert!(json.get("detail").is_none());
    }
}

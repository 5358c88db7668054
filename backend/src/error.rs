use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use shared::{ErrorCode, ErrorResponse};

use crate::classifier::ClassifyError;
use crate::fetch::FetchError;
use crate::normalize::NormalizeError;

/// Wire timestamp shared by success and error responses.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no image file provided")]
    NoImage,
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error("failed to read upload: {0}")]
    Upload(String),
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        ApiError::Upload(err.to_string())
    }
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::NoImage | ApiError::Normalize(_) | ApiError::Fetch(_) => ErrorCode::NoImage,
            ApiError::Classify(ClassifyError::MissingCredential) => ErrorCode::ConfigError,
            ApiError::Classify(ClassifyError::MalformedResponse(_))
            | ApiError::Classify(ClassifyError::UnexpectedShape) => ErrorCode::InvalidResponse,
            ApiError::Classify(_) => ErrorCode::ApiError,
            ApiError::Upload(_) => ErrorCode::UnknownError,
        }
    }

    fn user_message(&self) -> String {
        match self {
            ApiError::NoImage | ApiError::Normalize(NormalizeError::UnsupportedMedia(_)) => {
                "Please select an image to analyze.".to_string()
            }
            ApiError::Normalize(_) => {
                "Could not read the provided image. Please try another one.".to_string()
            }
            ApiError::Fetch(e) => format!("Could not load the image URL: {e}"),
            ApiError::Classify(ClassifyError::MissingCredential) => {
                "Server configuration error. Please try again later.".to_string()
            }
            ApiError::Classify(ClassifyError::MalformedResponse(_))
            | ApiError::Classify(ClassifyError::UnexpectedShape) => {
                "Received invalid response from AI service. Please try again.".to_string()
            }
            ApiError::Classify(_) => "Error connecting to AI service. Please try again.".to_string(),
            ApiError::Upload(_) => "Error processing image. Please try again.".to_string(),
        }
    }

    fn details(&self) -> String {
        match self {
            // Configuration internals stay in the server log.
            ApiError::Classify(ClassifyError::MissingCredential) => {
                "API configuration error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::NoImage => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("request failed ({}): {}", self.code(), self);
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.user_message(),
            code: self.code(),
            details: self.details(),
            timestamp: timestamp_now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_the_documented_statuses() {
        let cases: Vec<(ApiError, ErrorCode, StatusCode)> = vec![
            (ApiError::NoImage, ErrorCode::NoImage, StatusCode::BAD_REQUEST),
            (
                ApiError::Normalize(NormalizeError::UnsupportedMedia("text/plain".into())),
                ErrorCode::NoImage,
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Fetch(FetchError::NotAnImage("text/html".into())),
                ErrorCode::NoImage,
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Classify(ClassifyError::MissingCredential),
                ErrorCode::ConfigError,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Classify(ClassifyError::UnexpectedShape),
                ErrorCode::InvalidResponse,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Classify(ClassifyError::RetryExhausted {
                    attempts: 5,
                    last: "status 503".into(),
                }),
                ErrorCode::ApiError,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Upload("truncated".into()),
                ErrorCode::UnknownError,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, code, status) in cases {
            assert_eq!(error.code(), code, "{error}");
            assert_eq!(error.status_code(), status, "{error}");
        }
    }

    #[test]
    fn config_error_details_never_carry_internals() {
        let error = ApiError::Classify(ClassifyError::MissingCredential);
        assert_eq!(error.details(), "API configuration error");
        assert_eq!(
            error.user_message(),
            "Server configuration error. Please try again later."
        );
    }
}

use crate::service::{Outcome, Rejection};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::borrow::Cow;
use tracker_core::validation::FieldError;
use utoipa::ToSchema;

pub type ErrorMessageType = Cow<'static, str>;

/// A successful body with the status it is sent with.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status_code: StatusCode,
    body: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status_code: StatusCode::OK,
            body,
        }
    }

    pub fn created(body: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.body)).into_response()
    }
}

/// Plain `{message}` body, used for confirmations like deletes.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    #[schema(value_type = String)]
    pub message: ErrorMessageType,
}

impl MessageBody {
    pub fn new(message: impl Into<ErrorMessageType>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    status_code: StatusCode,
    #[schema(value_type = String)]
    message: ErrorMessageType,
    /// Only present for validation failures, one entry per failing field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: impl Into<ErrorMessageType>) -> Self {
        Self {
            status_code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: "invalid request".into(),
            errors,
        }
    }

    pub fn bad_request(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn unauthorized(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<Rejection> for ApiError {
    fn from(value: Rejection) -> Self {
        match value {
            Rejection::Invalid(errors) => Self::invalid(errors),
            Rejection::Conflict(message) | Rejection::BadRequest(message) => {
                Self::bad_request(message)
            }
            Rejection::NotFound(what) => Self::not_found(what),
            Rejection::Unauthorized(message) => Self::unauthorized(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::bad_request(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Done(body) => ApiResponse::ok(body).into_response(),
            Outcome::Rejected(rejection) => ApiError::from(rejection).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_list_every_field() {
        let error = ApiError::from(Rejection::Invalid(vec![
            FieldError::new("defectTitle", "Defect title is required"),
            FieldError::new("defectStatus", "Defect status is required"),
        ]));

        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(StatusCode::BAD_REQUEST, error.status_code);
        assert_eq!("defectTitle", json["errors"][0]["field"]);
        assert_eq!("defectStatus", json["errors"][1]["field"]);
    }

    #[test]
    fn plain_rejections_have_no_errors_array() {
        let error = ApiError::from(Rejection::NotFound("Review"));

        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(StatusCode::NOT_FOUND, error.status_code);
        assert_eq!(serde_json::json!({ "message": "Review not found" }), json);
    }
}

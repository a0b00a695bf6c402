use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use error_stack::Report;
use serde_json::json;
use std::error::Error;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Unclassified failure while running an endpoint.
/// The report is logged in full, the caller only ever sees a generic 500.
#[derive(thiserror::Error)]
#[error("there was an error running the endpoint")]
pub struct EndpointError<T: Error>(Report<T>);

impl<T: Error> std::fmt::Debug for EndpointError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> From<Report<T>> for EndpointError<T>
where
    T: Error,
{
    fn from(value: Report<T>) -> Self {
        Self(value)
    }
}

impl<T: Error> IntoResponse for EndpointError<T> {
    fn into_response(self) -> axum::response::Response {
        error!("endpoint failed: {:?}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": INTERNAL_ERROR_MESSAGE })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::EndpointError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use error_stack::Report;

    #[derive(Debug, thiserror::Error)]
    #[error("repository exploded")]
    struct Exploded;

    #[test]
    fn endpoint_error_is_internal_server_error() {
        let response = EndpointError::from(Report::new(Exploded)).into_response();

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    }
}

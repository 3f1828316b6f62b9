use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use biblio_core::{Facet, SearchError};
use serde_json::json;
use thiserror::Error;

/// A failed request: the route's message plus the underlying cause.
#[derive(Debug, Error)]
#[error("{message}: {source}")]
pub struct ApiError {
    pub message: &'static str,
    #[source]
    pub source: SearchError,
}

impl ApiError {
    pub fn search(source: SearchError) -> Self {
        Self { message: "Error during search", source }
    }

    pub fn facet(facet: Facet, source: SearchError) -> Self {
        let message = match facet {
            Facet::Source => "Error retrieving sources",
            Facet::Type => "Error retrieving types",
            Facet::Publisher => "Error retrieving publishers",
            Facet::City => "Error retrieving cities",
        };
        Self { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self.source {
            SearchError::InvalidDateFormat { .. } => StatusCode::BAD_REQUEST,
            SearchError::StoreExecution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.source, "{}", self.message);
        } else {
            tracing::debug!(error = %self.source, "{}", self.message);
        }
        let body = Json(json!({
            "message": self.message,
            "error": self.source.to_string(),
        }));
        (status, body).into_response()
    }
}

use axum::{
    Json,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::time::Instant;

use super::error::{ErrorEnvelope, ErrorMessage};

/// Logs every request and rewrites error responses into the shared envelope.
/// Handlers attach the human-readable message as an [`ErrorMessage`]
/// extension; only this middleware knows the request path, so the envelope
/// is completed here.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis();

    if status.is_client_error() || status.is_server_error() {
        let message = response.extensions().get::<ErrorMessage>().map_or_else(
            || {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            },
            |m| m.0.clone(),
        );

        if status.is_server_error() {
            tracing::error!(
                %method,
                %path,
                status = status.as_u16(),
                duration_ms,
                "{message}"
            );
        } else {
            tracing::warn!(
                %method,
                %path,
                status = status.as_u16(),
                duration_ms,
                "{message}"
            );
        }

        let envelope = ErrorEnvelope {
            status_code: status.as_u16(),
            message,
            timestamp: Utc::now().to_rfc3339(),
            path,
        };

        return (status, Json(envelope)).into_response();
    }

    tracing::info!(
        %method,
        %path,
        status = status.as_u16(),
        duration_ms,
        "Request completed"
    );

    response
}

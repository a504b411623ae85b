//! Webhook handlers for Jenkins build events

use axum::{
    Json,
    body::Bytes,
    extract::{State as AxumState, rejection::BytesRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::SharedState;
use crate::event::JenkinsEvent;
use crate::translate;

/// POST /webhook/jenkins - Translate a build event and forward it to Discord
#[instrument(skip_all, fields(delivery_id = %uuid::Uuid::now_v7()))]
pub async fn handle_jenkins_webhook(
    AxumState(state): AxumState<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            error!("Error reading request body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid payload" })),
            );
        }
    };

    let event = match JenkinsEvent::from_slice(&body, state.config.input_shape) {
        Ok(event) => event,
        Err(e) => {
            error!("Error binding payload: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid payload" })),
            );
        }
    };

    info!(
        "Received Jenkins webhook ({} shape): {}",
        event.shape(),
        event.summary()
    );

    let message = translate::convert(&event);

    if let Err(e) = state.notifier.send(&message).await {
        error!("Error sending to Discord: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to send to Discord" })),
        );
    }

    (StatusCode::OK, Json(json!({ "status": "success" })))
}

/// POST /webhook/print - Log the raw body and echo it back, for wiring up
/// new Jenkins jobs
pub async fn print_request_body(body: Result<Bytes, BytesRejection>) -> impl IntoResponse {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            error!("Error reading request body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Failed to read request body" })),
            );
        }
    };

    let body_content = String::from_utf8_lossy(&body);
    info!("Request Body Content:\n{}", body_content);

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "body_content": body_content,
            "content_length": body.len(),
        })),
    )
}

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::EventReceivedResponse;

use super::super::state::AppState;

/// Store one event posted by the recorder extension
pub async fn receive_event(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<EventReceivedResponse>> {
    let Json(event) = payload
        .map_err(|e| AppError::ValidationError(format!("Request must be JSON: {}", e)))?;

    if !event.is_object() {
        return Err(AppError::ValidationError(
            "Event must be a JSON object".to_string(),
        ));
    }

    let event_type = event
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("<none>")
        .to_string();

    let store_state = Arc::clone(&state);
    let path = tokio::task::spawn_blocking(move || store_state.store.save(&event))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    tracing::info!("Received {} event, saved as {}", event_type, path.display());

    Ok(Json(EventReceivedResponse {
        status: "success".to_string(),
        message: format!("Event received and saved as {}", path.display()),
    }))
}

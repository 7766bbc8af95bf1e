use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::ReplayBundle;
use crate::store::compile_loaded;

use super::super::state::AppState;

/// Compile the events recorded so far for a task into an exact-replay bundle
pub async fn get_exact_replay(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<ReplayBundle>> {
    let store_state = Arc::clone(&state);
    let lookup_id = task_id.clone();
    let loaded = tokio::task::spawn_blocking(move || store_state.store.load_task(&lookup_id))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    if loaded.is_empty() {
        return Err(AppError::TaskNotFound(task_id));
    }

    let bundle = compile_loaded(&loaded)?;

    tracing::info!(
        "Compiled {} events of task {} into {} actions",
        loaded.len(),
        task_id,
        bundle.action_list.len()
    );

    Ok(Json(bundle))
}

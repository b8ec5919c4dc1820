use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::webserver::{
    models::SendPromptRequest,
    state::AppState,
    utils::{success_response, ApiError},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prompts", post(send_prompt))
        .route("/prompts/history", get(get_history))
}

/// POST /api/prompts
async fn send_prompt(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendPromptRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::bad_request("Invalid JSON body", rejection.body_text()))?;

    let outcome = state
        .prompts
        .send(request.prompt, request.metadata, request.user_id)
        .await?;
    Ok(success_response(outcome))
}

/// GET /api/prompts/history
async fn get_history(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    Ok(success_response(state.prompts.history().await?))
}

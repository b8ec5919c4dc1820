use crate::webserver::{state::AppState, utils::ApiError};
use axum::{http::Uri, Router};
use std::sync::Arc;

pub mod dashboard;
pub mod docs;
pub mod orders;
pub mod prompts;
pub mod status;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(docs::routes())
        .fallback(not_found)
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(status::routes())
        .merge(dashboard::routes())
        .merge(orders::routes())
        .merge(prompts::routes())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found("Route not found", format!("No route for {}", uri.path()))
}

/// Dashboard endpoints
///
/// Metrics come from the freshness cache; the order table is queried live.
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{
    database::OrderFilter,
    webserver::{
        models::DashboardOrdersQuery,
        state::AppState,
        utils::{success_response, ApiError},
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sql/dashboard/metrics", get(get_dashboard_metrics))
        .route("/sql/dashboard/orders", get(get_dashboard_orders))
}

/// GET /api/sql/dashboard/metrics
async fn get_dashboard_metrics(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let snapshot = state.metrics.get_or_refresh().await?;
    Ok(success_response(snapshot.as_ref()))
}

/// GET /api/sql/dashboard/orders?customerId=&status=&limit=
async fn get_dashboard_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardOrdersQuery>,
) -> Result<Response, ApiError> {
    let filter = OrderFilter::from_query(
        params.customer_id.as_deref(),
        params.status.as_deref(),
        params.limit.as_deref(),
        state.orders.bounds(),
    )?;

    let rows = state.orders.list_dashboard_orders(&filter).await?;
    Ok(success_response(rows))
}

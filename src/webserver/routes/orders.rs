/// Order CRUD endpoints
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{
    database::{NewOrder, OrderUpdate},
    webserver::{
        models::{MessageResponse, OrderCreatedResponse},
        state::AppState,
        utils::{success_response, ApiError},
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sql/orders", post(create_order))
        .route(
            "/sql/orders/:orderId",
            get(get_order).put(update_order).delete(delete_order),
        )
}

fn parse_order_id(raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request(
            "Invalid order id",
            format!("'{}' is not a positive integer", raw),
        )),
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request("Invalid JSON body", rejection.body_text()))
}

fn order_not_found(order_id: i64) -> ApiError {
    ApiError::not_found("Order not found", format!("No order with id {}", order_id))
}

/// POST /api/sql/orders
async fn create_order(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Response, ApiError> {
    let order = json_body(body)?;
    let id = state.orders.create_order(order).await?;
    Ok(success_response(OrderCreatedResponse {
        message: "Order created successfully".to_string(),
        sales_order_id: id,
    }))
}

/// GET /api/sql/orders/:orderId
async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    match state.orders.get_order(order_id).await? {
        Some(details) => Ok(success_response(details)),
        None => Err(order_not_found(order_id)),
    }
}

/// PUT /api/sql/orders/:orderId
async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    body: Result<Json<OrderUpdate>, JsonRejection>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    let update = json_body(body)?;
    if state.orders.update_order(order_id, update).await? {
        Ok(success_response(MessageResponse::new("Order updated successfully")))
    } else {
        Err(order_not_found(order_id))
    }
}

/// DELETE /api/sql/orders/:orderId
async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    if state.orders.delete_order(order_id).await? {
        Ok(success_response(MessageResponse::new("Order deleted successfully")))
    } else {
        Err(order_not_found(order_id))
    }
}

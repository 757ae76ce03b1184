//! Orders API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::order::{CreateOrder, Order, UpdateOrder},
};

/// Get an order
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "Order not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Order>> {
    let order = state.services.orders.get(id).await?;
    Ok(Json(order))
}

/// Create an order
#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Validation failure", body = crate::error::FieldErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.services.orders.create(data).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Update an order; forbidden once the order has started
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrder,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, description = "Validation failure", body = crate::error::FieldErrorResponse)
    )
)]
pub async fn update_order(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateOrder>,
) -> AppResult<Json<Order>> {
    let order = state.services.orders.update(id, data).await?;
    Ok(Json(order))
}

/// Delete an order
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted")
    )
)]
pub async fn delete_order(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Services (catalog) API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::service::{CreateService, Service, UpdateService},
};

/// Get a service
#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service", body = Service),
        (status = 404, description = "Service not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_service(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Service>> {
    let service = state.services.catalog.get(id).await?;
    Ok(Json(service))
}

/// Create a service
#[utoipa::path(
    post,
    path = "/services",
    tag = "services",
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Validation failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_service(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    let service = state.services.catalog.create(&data).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Update a service
#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = UpdateService,
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 400, description = "Validation failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_service(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateService>,
) -> AppResult<Json<Service>> {
    let service = state.services.catalog.update(id, &data).await?;
    Ok(Json(service))
}

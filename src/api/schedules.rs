//! Schedule API endpoints (weekly rules and closed periods, both owners)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::schedule::{
        ClosedPeriod, CreateClosedPeriod, CreateScheduleRule, ScheduleOwner, ScheduleRule,
    },
};

// ---- Professional rules ----

/// List a professional's weekly rules
#[utoipa::path(
    get,
    path = "/professionals/{id}/schedule",
    tag = "schedules",
    params(("id" = i32, Path, description = "Professional ID")),
    responses(
        (status = 200, description = "Weekly rules", body = Vec<ScheduleRule>)
    )
)]
pub async fn list_professional_rules(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ScheduleRule>>> {
    let rules = state
        .services
        .schedules
        .list_rules(ScheduleOwner::Professional(id))
        .await?;
    Ok(Json(rules))
}

/// Create a weekly rule for a professional
#[utoipa::path(
    post,
    path = "/professionals/{id}/schedule",
    tag = "schedules",
    params(("id" = i32, Path, description = "Professional ID")),
    request_body = CreateScheduleRule,
    responses(
        (status = 201, description = "Rule created", body = ScheduleRule),
        (status = 400, description = "Validation failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_professional_rule(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<CreateScheduleRule>,
) -> AppResult<(StatusCode, Json<ScheduleRule>)> {
    let rule = state
        .services
        .schedules
        .create_rule(ScheduleOwner::Professional(id), &data)
        .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// Delete a professional's weekly rule
#[utoipa::path(
    delete,
    path = "/professionals/{id}/schedule/{rule_id}",
    tag = "schedules",
    params(
        ("id" = i32, Path, description = "Professional ID"),
        ("rule_id" = i32, Path, description = "Rule ID")
    ),
    responses((status = 204, description = "Rule deleted"))
)]
pub async fn delete_professional_rule(
    State(state): State<crate::AppState>,
    Path((id, rule_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    state
        .services
        .schedules
        .delete_rule(ScheduleOwner::Professional(id), rule_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Service rules ----

/// List a service's weekly rules
#[utoipa::path(
    get,
    path = "/services/{id}/schedule",
    tag = "schedules",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Weekly rules", body = Vec<ScheduleRule>)
    )
)]
pub async fn list_service_rules(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ScheduleRule>>> {
    let rules = state
        .services
        .schedules
        .list_rules(ScheduleOwner::Service(id))
        .await?;
    Ok(Json(rules))
}

/// Create a weekly rule for a service
#[utoipa::path(
    post,
    path = "/services/{id}/schedule",
    tag = "schedules",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = CreateScheduleRule,
    responses(
        (status = 201, description = "Rule created", body = ScheduleRule),
        (status = 400, description = "Validation failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_service_rule(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<CreateScheduleRule>,
) -> AppResult<(StatusCode, Json<ScheduleRule>)> {
    let rule = state
        .services
        .schedules
        .create_rule(ScheduleOwner::Service(id), &data)
        .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// Delete a service's weekly rule
#[utoipa::path(
    delete,
    path = "/services/{id}/schedule/{rule_id}",
    tag = "schedules",
    params(
        ("id" = i32, Path, description = "Service ID"),
        ("rule_id" = i32, Path, description = "Rule ID")
    ),
    responses((status = 204, description = "Rule deleted"))
)]
pub async fn delete_service_rule(
    State(state): State<crate::AppState>,
    Path((id, rule_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    state
        .services
        .schedules
        .delete_rule(ScheduleOwner::Service(id), rule_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Professional closed periods ----

/// List a professional's closed periods
#[utoipa::path(
    get,
    path = "/professionals/{id}/closed-periods",
    tag = "schedules",
    params(("id" = i32, Path, description = "Professional ID")),
    responses(
        (status = 200, description = "Closed periods", body = Vec<ClosedPeriod>)
    )
)]
pub async fn list_professional_periods(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ClosedPeriod>>> {
    let periods = state
        .services
        .schedules
        .list_periods(ScheduleOwner::Professional(id))
        .await?;
    Ok(Json(periods))
}

/// Create a closed period for a professional
#[utoipa::path(
    post,
    path = "/professionals/{id}/closed-periods",
    tag = "schedules",
    params(("id" = i32, Path, description = "Professional ID")),
    request_body = CreateClosedPeriod,
    responses(
        (status = 201, description = "Closed period created", body = ClosedPeriod),
        (status = 400, description = "Validation failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_professional_period(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<CreateClosedPeriod>,
) -> AppResult<(StatusCode, Json<ClosedPeriod>)> {
    let period = state
        .services
        .schedules
        .create_period(ScheduleOwner::Professional(id), &data)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// Delete a professional's closed period
#[utoipa::path(
    delete,
    path = "/professionals/{id}/closed-periods/{period_id}",
    tag = "schedules",
    params(
        ("id" = i32, Path, description = "Professional ID"),
        ("period_id" = i32, Path, description = "Closed period ID")
    ),
    responses((status = 204, description = "Closed period deleted"))
)]
pub async fn delete_professional_period(
    State(state): State<crate::AppState>,
    Path((id, period_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    state
        .services
        .schedules
        .delete_period(ScheduleOwner::Professional(id), period_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Service closed periods ----

/// List a service's closed periods
#[utoipa::path(
    get,
    path = "/services/{id}/closed-periods",
    tag = "schedules",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Closed periods", body = Vec<ClosedPeriod>)
    )
)]
pub async fn list_service_periods(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ClosedPeriod>>> {
    let periods = state
        .services
        .schedules
        .list_periods(ScheduleOwner::Service(id))
        .await?;
    Ok(Json(periods))
}

/// Create a closed period for a service
#[utoipa::path(
    post,
    path = "/services/{id}/closed-periods",
    tag = "schedules",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = CreateClosedPeriod,
    responses(
        (status = 201, description = "Closed period created", body = ClosedPeriod),
        (status = 400, description = "Validation failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_service_period(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<CreateClosedPeriod>,
) -> AppResult<(StatusCode, Json<ClosedPeriod>)> {
    let period = state
        .services
        .schedules
        .create_period(ScheduleOwner::Service(id), &data)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// Delete a service's closed period
#[utoipa::path(
    delete,
    path = "/services/{id}/closed-periods/{period_id}",
    tag = "schedules",
    params(
        ("id" = i32, Path, description = "Service ID"),
        ("period_id" = i32, Path, description = "Closed period ID")
    ),
    responses((status = 204, description = "Closed period deleted"))
)]
pub async fn delete_service_period(
    State(state): State<crate::AppState>,
    Path((id, period_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    state
        .services
        .schedules
        .delete_period(ScheduleOwner::Service(id), period_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

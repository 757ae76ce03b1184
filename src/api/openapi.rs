//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{calendar, catalog, health, orders, schedules};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ordena API",
        version = "0.3.0",
        description = "Availability & booking REST API for the services marketplace",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Ordena Team", email = "dev@ordena.app")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Calendar
        calendar::get_calendar,
        // Orders
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        // Services
        catalog::get_service,
        catalog::create_service,
        catalog::update_service,
        // Schedules
        schedules::list_professional_rules,
        schedules::create_professional_rule,
        schedules::delete_professional_rule,
        schedules::list_service_rules,
        schedules::create_service_rule,
        schedules::delete_service_rule,
        schedules::list_professional_periods,
        schedules::create_professional_period,
        schedules::delete_professional_period,
        schedules::list_service_periods,
        schedules::create_service_period,
        schedules::delete_service_period,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::calendar::CalendarEntry,
            crate::error::ErrorResponse,
            crate::error::FieldErrorResponse,
            crate::models::enums::CalendarPeriod,
            crate::models::enums::OrderStatus,
            crate::models::enums::ServiceType,
            crate::models::order::Order,
            crate::models::order::CreateOrder,
            crate::models::order::UpdateOrder,
            crate::models::professional::Professional,
            crate::models::schedule::AvailabilitySlot,
            crate::models::schedule::ClosedPeriod,
            crate::models::schedule::CreateClosedPeriod,
            crate::models::schedule::CreateScheduleRule,
            crate::models::schedule::ScheduleRule,
            crate::models::service::CreateService,
            crate::models::service::Price,
            crate::models::service::Service,
            crate::models::service::ServiceLocation,
            crate::models::service::UpdateService,
            crate::models::user::User,
            crate::models::user::UserLocation,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "calendar", description = "Availability slot queries"),
        (name = "orders", description = "Order booking"),
        (name = "services", description = "Service catalog"),
        (name = "schedules", description = "Weekly rules and closed periods"),
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

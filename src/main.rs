//! Ordena Server - availability & booking core
//!
//! REST API server for the services marketplace booking subsystem.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ordena_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{lock::DistributedLock, tasks::ScheduledTasks, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("ordena_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ordena Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Initialize the distributed lock (Redis)
    let lock = DistributedLock::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    tracing::info!("Connected to Redis");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository.clone(), &config, lock.clone())
        .await
        .expect("Failed to create services");

    // Start the daily append and purge jobs
    let _tasks = ScheduledTasks::start(
        repository,
        services.generator.clone(),
        lock,
        services.clock.clone(),
        &config.regeneration,
    )
    .await
    .expect("Failed to start scheduled tasks");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Calendar
        .route("/calendar", get(api::calendar::get_calendar))
        // Orders
        .route("/orders", post(api::orders::create_order))
        .route("/orders/:id", get(api::orders::get_order))
        .route("/orders/:id", patch(api::orders::update_order))
        .route("/orders/:id", delete(api::orders::delete_order))
        // Services
        .route("/services", post(api::catalog::create_service))
        .route("/services/:id", get(api::catalog::get_service))
        .route("/services/:id", put(api::catalog::update_service))
        // Professional schedules
        .route(
            "/professionals/:id/schedule",
            get(api::schedules::list_professional_rules),
        )
        .route(
            "/professionals/:id/schedule",
            post(api::schedules::create_professional_rule),
        )
        .route(
            "/professionals/:id/schedule/:rule_id",
            delete(api::schedules::delete_professional_rule),
        )
        // Service schedules
        .route(
            "/services/:id/schedule",
            get(api::schedules::list_service_rules),
        )
        .route(
            "/services/:id/schedule",
            post(api::schedules::create_service_rule),
        )
        .route(
            "/services/:id/schedule/:rule_id",
            delete(api::schedules::delete_service_rule),
        )
        // Professional closed periods
        .route(
            "/professionals/:id/closed-periods",
            get(api::schedules::list_professional_periods),
        )
        .route(
            "/professionals/:id/closed-periods",
            post(api::schedules::create_professional_period),
        )
        .route(
            "/professionals/:id/closed-periods/:period_id",
            delete(api::schedules::delete_professional_period),
        )
        // Service closed periods
        .route(
            "/services/:id/closed-periods",
            get(api::schedules::list_service_periods),
        )
        .route(
            "/services/:id/closed-periods",
            post(api::schedules::create_service_period),
        )
        .route(
            "/services/:id/closed-periods/:period_id",
            delete(api::schedules::delete_service_period),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

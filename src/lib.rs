//! Ordena Availability & Booking Server
//!
//! The booking core of the Ordena services marketplace: expands weekly
//! schedules into bookable availability slots, validates orders against
//! them, and serves calendar queries over a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod availability;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod interval;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

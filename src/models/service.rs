//! Service models (services, locations, prices)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::ServiceType;

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// A bookable service offered by a professional
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Service {
    pub id: i32,
    /// Owning professional
    pub professional_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Duration in minutes
    pub duration: i32,
    pub service_type: ServiceType,
    /// When true the service inherits the professional's weekly schedule
    /// instead of its own
    pub is_base_schedule: bool,
    /// Are orders confirmed automatically?
    pub is_auto_order_confirmation: bool,
    pub is_enabled: bool,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create service request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateService {
    pub professional_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Duration in minutes (positive)
    pub duration: i32,
    pub service_type: ServiceType,
    #[serde(default)]
    pub is_base_schedule: bool,
    #[serde(default = "default_true")]
    pub is_auto_order_confirmation: bool,
    #[serde(default)]
    pub is_enabled: bool,
}

/// Update service request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateService {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub service_type: Option<ServiceType>,
    pub is_base_schedule: Option<bool>,
    pub is_auto_order_confirmation: Option<bool>,
    pub is_enabled: Option<bool>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// ServiceLocation
// ---------------------------------------------------------------------------

/// A location a professional-location service is performed at
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ServiceLocation {
    pub id: i32,
    pub service_id: i32,
    pub address: String,
    pub crea_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// Service price: either a fixed amount or a start/end range in one currency
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Price {
    pub id: i32,
    pub service_id: i32,
    pub is_price_fixed: bool,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub start_price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub end_price: Option<Decimal>,
    pub currency: String,
}

impl Price {
    /// Range prices must be ordered; fixed prices ignore the range columns.
    pub fn is_valid(&self) -> bool {
        if self.is_price_fixed {
            return true;
        }
        match (self.start_price, self.end_price) {
            (Some(start), Some(end)) => start <= end,
            _ => false,
        }
    }
}

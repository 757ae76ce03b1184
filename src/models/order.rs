//! Order model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::OrderStatus;
use crate::interval::Interval;

/// A client booking for a service over a UTC half-open interval
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i32,
    pub service_id: i32,
    pub client_id: i32,
    pub status: OrderStatus,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub service_location_id: Option<i32>,
    pub client_location_id: Option<i32>,
    pub note: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub price_currency: Option<String>,
    /// Minutes before the start to remind the client
    pub remind_before: Option<i32>,
    pub is_for_another_person: bool,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Order {
    /// Order duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_datetime - self.start_datetime).num_minutes()
    }

    pub fn interval(&self) -> Option<Interval> {
        Interval::new(self.start_datetime, self.end_datetime)
    }
}

/// A filled, validated order draft ready to persist
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub service_id: i32,
    pub client_id: i32,
    pub status: OrderStatus,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub service_location_id: Option<i32>,
    pub client_location_id: Option<i32>,
    pub note: Option<String>,
    pub price: Option<Decimal>,
    pub price_currency: Option<String>,
    pub remind_before: Option<i32>,
    pub is_for_another_person: bool,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl NewOrder {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_datetime - self.start_datetime).num_minutes()
    }
}

/// Create order request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrder {
    pub service_id: i32,
    pub client_id: i32,
    pub start_datetime: DateTime<Utc>,
    /// Defaults to `start + service.duration`
    pub end_datetime: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
    pub service_location_id: Option<i32>,
    pub client_location_id: Option<i32>,
    pub note: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub price_currency: Option<String>,
    pub remind_before: Option<i32>,
    #[serde(default)]
    pub is_for_another_person: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Update order request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrder {
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
    pub service_location_id: Option<i32>,
    pub client_location_id: Option<i32>,
    pub note: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub price_currency: Option<String>,
    pub remind_before: Option<i32>,
    pub is_for_another_person: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

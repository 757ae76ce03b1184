//! Client user model and locations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A client account. Contact fields are the source for order auto-fill.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub crea_date: Option<DateTime<Utc>>,
}

/// A client-owned location (used for client-location services)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserLocation {
    pub id: i32,
    pub user_id: i32,
    pub address: String,
    pub crea_date: Option<DateTime<Utc>>,
}

//! Professional model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A professional account offering services
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Professional {
    pub id: i32,
    /// Owning user account
    pub user_id: i32,
    pub name: String,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

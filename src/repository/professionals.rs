//! Professionals repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::professional::Professional,
};

#[derive(Clone)]
pub struct ProfessionalsRepository {
    pool: Pool<Postgres>,
}

impl ProfessionalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a professional by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Professional> {
        sqlx::query_as::<_, Professional>("SELECT * FROM professionals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Professional {} not found", id)))
    }

    /// All professionals, the population of the daily append run
    pub async fn list_for_generation(&self) -> AppResult<Vec<Professional>> {
        let rows = sqlx::query_as::<_, Professional>("SELECT * FROM professionals ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

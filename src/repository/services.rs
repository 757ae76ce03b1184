//! Services repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::service::{CreateService, Price, Service, ServiceLocation, UpdateService},
};

#[derive(Clone)]
pub struct ServicesRepository {
    pool: Pool<Postgres>,
}

impl ServicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a service by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Service> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }

    /// Smallest duration among the professional's enabled services; 0 if none
    pub async fn min_duration(&self, professional_id: i32) -> AppResult<i32> {
        let min: Option<i32> = sqlx::query_scalar(
            "SELECT MIN(duration) FROM services WHERE professional_id = $1 AND is_enabled",
        )
        .bind(professional_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(min.unwrap_or(0))
    }

    /// Enabled services that keep their own schedule (not base-schedule);
    /// the population of the daily append run
    pub async fn list_for_generation(&self) -> AppResult<Vec<Service>> {
        let rows = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE is_enabled AND NOT is_base_schedule ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a service
    pub async fn create(&self, data: &CreateService) -> AppResult<Service> {
        let row = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services
                (professional_id, name, description, duration, service_type,
                 is_base_schedule, is_auto_order_confirmation, is_enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.professional_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.duration)
        .bind(data.service_type)
        .bind(data.is_base_schedule)
        .bind(data.is_auto_order_confirmation)
        .bind(data.is_enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a service
    pub async fn update(&self, id: i32, data: &UpdateService) -> AppResult<Service> {
        let row = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                duration = COALESCE($4, duration),
                service_type = COALESCE($5, service_type),
                is_base_schedule = COALESCE($6, is_base_schedule),
                is_auto_order_confirmation = COALESCE($7, is_auto_order_confirmation),
                is_enabled = COALESCE($8, is_enabled),
                modif_date = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.duration)
        .bind(data.service_type)
        .bind(data.is_base_schedule)
        .bind(data.is_auto_order_confirmation)
        .bind(data.is_enabled)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))?;
        Ok(row)
    }

    /// Get a service location by ID
    pub async fn get_location(&self, id: i32) -> AppResult<ServiceLocation> {
        sqlx::query_as::<_, ServiceLocation>("SELECT * FROM service_locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service location {} not found", id)))
    }

    /// Get the service's price definition, if any
    pub async fn get_price(&self, service_id: i32) -> AppResult<Option<Price>> {
        let row = sqlx::query_as::<_, Price>("SELECT * FROM prices WHERE service_id = $1")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

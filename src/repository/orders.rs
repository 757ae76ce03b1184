//! Orders repository
//!
//! The write path runs its overlap and encompassing-slot checks inside the
//! same transaction that persists the order, so concurrent clients cannot
//! double-book a professional.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult, OrderErrorKind},
    models::{
        order::{NewOrder, Order},
        schedule::ScheduleOwner,
        service::Service,
    },
};

#[derive(Clone)]
pub struct OrdersRepository {
    pool: Pool<Postgres>,
}

impl OrdersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get an order by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))
    }

    /// Orders intersecting `[start, end)` for a professional, optionally
    /// narrowed to a service
    pub async fn get_between(
        &self,
        professional_id: i32,
        service_id: Option<i32>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(
            r#"
            SELECT o.* FROM orders o
            JOIN services s ON o.service_id = s.id
            WHERE s.professional_id = $1
              AND ($2::int IS NULL OR o.service_id = $2)
              AND o.start_datetime < $3 AND o.end_datetime > $4
            ORDER BY o.start_datetime
            "#,
        )
        .bind(professional_id)
        .bind(service_id)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Active (non-terminal) orders of the same professional overlapping the
    /// interval
    pub async fn get_overlapping(
        &self,
        professional_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(
            r#"
            SELECT o.* FROM orders o
            JOIN services s ON o.service_id = s.id
            WHERE s.professional_id = $1
              AND o.start_datetime < $2 AND o.end_datetime > $3
              AND o.status NOT IN ('completed', 'canceled')
              AND ($4::int IS NULL OR o.id != $4)
            ORDER BY o.start_datetime
            "#,
        )
        .bind(professional_id)
        .bind(end)
        .bind(start)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a filled order, running the overlap and availability checks in
    /// the persisting transaction.
    pub async fn create_checked(&self, order: &NewOrder, service: &Service) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        if !order.status.is_terminal() {
            Self::check_overlap(
                &mut tx,
                service.professional_id,
                order.start_datetime,
                order.end_datetime,
                None,
            )
            .await?;
            Self::check_availability(&mut tx, service, order.start_datetime, order.end_datetime)
                .await?;
        }

        let row = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (service_id, client_id, status, start_datetime, end_datetime,
                 service_location_id, client_location_id, note, price, price_currency,
                 remind_before, is_for_another_person, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(order.service_id)
        .bind(order.client_id)
        .bind(order.status)
        .bind(order.start_datetime)
        .bind(order.end_datetime)
        .bind(order.service_location_id)
        .bind(order.client_location_id)
        .bind(&order.note)
        .bind(order.price)
        .bind(&order.price_currency)
        .bind(order.remind_before)
        .bind(order.is_for_another_person)
        .bind(&order.first_name)
        .bind(&order.last_name)
        .bind(&order.phone)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Update an order, re-running the checks in the persisting transaction.
    ///
    /// When the new interval overlaps the order's own saved interval, only
    /// the uncovered head/tail must be re-covered by availability slots: the
    /// order does not fail against slots it itself consumed.
    pub async fn update_checked(
        &self,
        id: i32,
        order: &NewOrder,
        service: &Service,
    ) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

        if !order.status.is_terminal() {
            Self::check_overlap(
                &mut tx,
                service.professional_id,
                order.start_datetime,
                order.end_datetime,
                Some(id),
            )
            .await?;

            let disjoint_from_saved = order.end_datetime <= saved.start_datetime
                || order.start_datetime >= saved.end_datetime;
            if disjoint_from_saved {
                Self::check_availability(&mut tx, service, order.start_datetime, order.end_datetime)
                    .await?;
            } else {
                if order.start_datetime < saved.start_datetime {
                    Self::check_availability(
                        &mut tx,
                        service,
                        order.start_datetime,
                        saved.start_datetime,
                    )
                    .await?;
                }
                if order.end_datetime > saved.end_datetime {
                    Self::check_availability(
                        &mut tx,
                        service,
                        saved.end_datetime,
                        order.end_datetime,
                    )
                    .await?;
                }
            }
        }

        let row = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET
                status = $2, start_datetime = $3, end_datetime = $4,
                service_location_id = $5, client_location_id = $6, note = $7,
                price = $8, price_currency = $9, remind_before = $10,
                is_for_another_person = $11, first_name = $12, last_name = $13,
                phone = $14, modif_date = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(order.status)
        .bind(order.start_datetime)
        .bind(order.end_datetime)
        .bind(order.service_location_id)
        .bind(order.client_location_id)
        .bind(&order.note)
        .bind(order.price)
        .bind(&order.price_currency)
        .bind(order.remind_before)
        .bind(order.is_for_another_person)
        .bind(&order.first_name)
        .bind(&order.last_name)
        .bind(&order.phone)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Delete an order
    pub async fn delete(&self, id: i32) -> AppResult<Order> {
        let row = sqlx::query_as::<_, Order>("DELETE FROM orders WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
        Ok(row)
    }

    async fn check_overlap(
        tx: &mut Transaction<'_, Postgres>,
        professional_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> AppResult<()> {
        let overlapping: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders o
            JOIN services s ON o.service_id = s.id
            WHERE s.professional_id = $1
              AND o.start_datetime < $2 AND o.end_datetime > $3
              AND o.status NOT IN ('completed', 'canceled')
              AND ($4::int IS NULL OR o.id != $4)
            "#,
        )
        .bind(professional_id)
        .bind(end)
        .bind(start)
        .bind(exclude_id)
        .fetch_one(&mut **tx)
        .await?;

        if overlapping > 0 {
            return Err(AppError::order(
                OrderErrorKind::Overlap,
                "Orders should not overlap",
            ));
        }
        Ok(())
    }

    /// An availability slot must fully contain `[start, end)` for the
    /// order's service, or for its professional when the service uses the
    /// base schedule.
    async fn check_availability(
        tx: &mut Transaction<'_, Postgres>,
        service: &Service,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<()> {
        if !service.is_enabled {
            return Err(AppError::order(
                OrderErrorKind::AvailabilityMissing,
                "The service is disabled",
            ));
        }

        let owner = if service.is_base_schedule {
            ScheduleOwner::Professional(service.professional_id)
        } else {
            ScheduleOwner::Service(service.id)
        };
        let count: i64 = match owner {
            ScheduleOwner::Professional(id) => {
                sqlx::query_scalar(
                    r#"
                    SELECT COUNT(*) FROM availability_slots
                    WHERE professional_id = $1 AND service_id IS NULL
                      AND start_datetime <= $2 AND end_datetime >= $3
                    "#,
                )
                .bind(id)
                .bind(start)
                .bind(end)
                .fetch_one(&mut **tx)
                .await?
            }
            ScheduleOwner::Service(id) => {
                sqlx::query_scalar(
                    r#"
                    SELECT COUNT(*) FROM availability_slots
                    WHERE service_id = $1
                      AND start_datetime <= $2 AND end_datetime >= $3
                    "#,
                )
                .bind(id)
                .bind(start)
                .bind(end)
                .fetch_one(&mut **tx)
                .await?
            }
        };

        if count == 0 {
            return Err(AppError::order(
                OrderErrorKind::AvailabilityMissing,
                "Availability slots not found",
            ));
        }
        Ok(())
    }
}

//! Availability slots repository

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::schedule::{AvailabilitySlot, NewAvailabilitySlot, ScheduleOwner},
};

#[derive(Clone)]
pub struct SlotsRepository {
    pool: Pool<Postgres>,
}

impl SlotsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Slots intersecting `[start, end)` for a professional, optionally
    /// narrowed to a service. Without a service only professional-level
    /// slots (service IS NULL) are returned.
    pub async fn get_between(
        &self,
        professional_id: i32,
        service_id: Option<i32>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<AvailabilitySlot>> {
        let rows = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT id, professional_id, service_id, start_datetime, end_datetime
            FROM availability_slots
            WHERE professional_id = $1
              AND (($2::int IS NULL AND service_id IS NULL) OR service_id = $2)
              AND start_datetime < $3 AND end_datetime > $4
            ORDER BY start_datetime
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

    /// Slots whose interval fully contains `[start, end)` for the owner
    pub async fn get_encompassing(
        &self,
        owner: ScheduleOwner,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<AvailabilitySlot>> {
        let query = match owner {
            ScheduleOwner::Professional(_) => {
                r#"
                SELECT id, professional_id, service_id, start_datetime, end_datetime
                FROM availability_slots
                WHERE professional_id = $1 AND service_id IS NULL
                  AND start_datetime <= $2 AND end_datetime >= $3
                "#
            }
            ScheduleOwner::Service(_) => {
                r#"
                SELECT id, professional_id, service_id, start_datetime, end_datetime
                FROM availability_slots
                WHERE service_id = $1
                  AND start_datetime <= $2 AND end_datetime >= $3
                "#
            }
        };
        let id = match owner {
            ScheduleOwner::Professional(id) | ScheduleOwner::Service(id) => id,
        };
        let rows = sqlx::query_as::<_, AvailabilitySlot>(query)
            .bind(id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Atomically replace the slot set for the regenerated window.
    ///
    /// Deletes every slot of the `(professional, optional service)` key
    /// overlapping `[window_start, window_end + 1 day)` and bulk-inserts the
    /// new ones in one transaction, so readers observe either the previous
    /// or the new set. An empty slot list is a no-op.
    pub async fn replace(
        &self,
        professional_id: i32,
        service_id: Option<i32>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        slots: &[NewAvailabilitySlot],
    ) -> AppResult<()> {
        if slots.is_empty() {
            return Ok(());
        }

        let delete_upper = window_end + Duration::days(1);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM availability_slots
            WHERE professional_id = $1
              AND (($2::int IS NULL AND service_id IS NULL) OR service_id = $2)
              AND start_datetime < $3 AND end_datetime > $4
            "#,
        )
        .bind(professional_id)
        .bind(service_id)
        .bind(delete_upper)
        .bind(window_start)
        .execute(&mut *tx)
        .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO availability_slots (professional_id, service_id, start_datetime, end_datetime) ",
        );
        builder.push_values(slots, |mut b, slot| {
            b.push_bind(slot.professional_id)
                .push_bind(slot.service_id)
                .push_bind(slot.start_datetime)
                .push_bind(slot.end_datetime);
        });
        builder.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Slots that ended before the given midnight
    pub async fn get_expired(&self, today_midnight: DateTime<Utc>) -> AppResult<Vec<AvailabilitySlot>> {
        let rows = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT id, professional_id, service_id, start_datetime, end_datetime
            FROM availability_slots
            WHERE end_datetime < $1
            ORDER BY start_datetime
            "#,
        )
        .bind(today_midnight)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete slots that ended before the given midnight; returns the count
    pub async fn delete_expired(&self, today_midnight: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM availability_slots WHERE end_datetime < $1")
            .bind(today_midnight)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

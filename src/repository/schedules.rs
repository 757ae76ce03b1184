//! Schedules repository (weekly rules and closed periods, both owners)

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::schedule::{ClosedPeriod, ScheduleOwner, ScheduleRule},
};

#[derive(Clone)]
pub struct SchedulesRepository {
    pool: Pool<Postgres>,
}

/// Column lists keep the row shape identical for both owner tables, so the
/// generator consumes one `ScheduleRule` type regardless of owner kind.
const PROFESSIONAL_RULE_COLS: &str = "id, professional_id, NULL::int AS service_id, day_of_week, \
     start_time, end_time, timezone, is_enabled, crea_date, modif_date";
const SERVICE_RULE_COLS: &str = "id, NULL::int AS professional_id, service_id, day_of_week, \
     start_time, end_time, timezone, is_enabled, crea_date, modif_date";
const PROFESSIONAL_PERIOD_COLS: &str = "id, professional_id, NULL::int AS service_id, \
     start_datetime, end_datetime, is_enabled, crea_date, modif_date";
const SERVICE_PERIOD_COLS: &str = "id, NULL::int AS professional_id, service_id, \
     start_datetime, end_datetime, is_enabled, crea_date, modif_date";

impl SchedulesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn rule_table(owner: ScheduleOwner) -> (&'static str, &'static str, &'static str, i32) {
        match owner {
            ScheduleOwner::Professional(id) => (
                "professional_schedules",
                "professional_id",
                PROFESSIONAL_RULE_COLS,
                id,
            ),
            ScheduleOwner::Service(id) => {
                ("service_schedules", "service_id", SERVICE_RULE_COLS, id)
            }
        }
    }

    fn period_table(owner: ScheduleOwner) -> (&'static str, &'static str, &'static str, i32) {
        match owner {
            ScheduleOwner::Professional(id) => (
                "professional_closed_periods",
                "professional_id",
                PROFESSIONAL_PERIOD_COLS,
                id,
            ),
            ScheduleOwner::Service(id) => (
                "service_closed_periods",
                "service_id",
                SERVICE_PERIOD_COLS,
                id,
            ),
        }
    }

    // ---- Rules ----

    /// List the owner's rules ordered by day and start time
    pub async fn list_rules(&self, owner: ScheduleOwner) -> AppResult<Vec<ScheduleRule>> {
        let (table, key, cols, id) = Self::rule_table(owner);
        let query = format!(
            "SELECT {cols} FROM {table} WHERE {key} = $1 ORDER BY day_of_week, start_time"
        );
        let rows = sqlx::query_as::<_, ScheduleRule>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Enabled rules grouped by day of week, ordered by start time within a day
    pub async fn rules_by_day(
        &self,
        owner: ScheduleOwner,
    ) -> AppResult<BTreeMap<i16, Vec<ScheduleRule>>> {
        let (table, key, cols, id) = Self::rule_table(owner);
        let query = format!(
            "SELECT {cols} FROM {table} WHERE {key} = $1 AND is_enabled \
             ORDER BY day_of_week, start_time"
        );
        let rows = sqlx::query_as::<_, ScheduleRule>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let mut by_day: BTreeMap<i16, Vec<ScheduleRule>> = BTreeMap::new();
        for rule in rows {
            by_day.entry(rule.day_of_week).or_default().push(rule);
        }
        Ok(by_day)
    }

    /// Get a rule by ID
    pub async fn get_rule(&self, owner: ScheduleOwner, id: i32) -> AppResult<ScheduleRule> {
        let (table, key, cols, owner_id) = Self::rule_table(owner);
        let query = format!("SELECT {cols} FROM {table} WHERE id = $1 AND {key} = $2");
        sqlx::query_as::<_, ScheduleRule>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule rule {} not found", id)))
    }

    /// Count enabled rules of the same owner and day overlapping the time span
    pub async fn count_overlapping_rules(
        &self,
        owner: ScheduleOwner,
        day_of_week: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
        exclude_id: Option<i32>,
    ) -> AppResult<i64> {
        let (table, key, _, id) = Self::rule_table(owner);
        let query = format!(
            "SELECT COUNT(*) FROM {table} \
             WHERE {key} = $1 AND day_of_week = $2 AND is_enabled \
               AND start_time < $3 AND end_time > $4 \
               AND ($5::int IS NULL OR id != $5)"
        );
        let count = sqlx::query_scalar(&query)
            .bind(id)
            .bind(day_of_week)
            .bind(end_time)
            .bind(start_time)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Create a rule
    pub async fn create_rule(
        &self,
        owner: ScheduleOwner,
        day_of_week: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
        timezone: &str,
        is_enabled: bool,
    ) -> AppResult<ScheduleRule> {
        let (table, key, cols, id) = Self::rule_table(owner);
        let query = format!(
            "INSERT INTO {table} ({key}, day_of_week, start_time, end_time, timezone, is_enabled) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {cols}"
        );
        let row = sqlx::query_as::<_, ScheduleRule>(&query)
            .bind(id)
            .bind(day_of_week)
            .bind(start_time)
            .bind(end_time)
            .bind(timezone)
            .bind(is_enabled)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a rule
    pub async fn delete_rule(&self, owner: ScheduleOwner, id: i32) -> AppResult<()> {
        let (table, key, _, owner_id) = Self::rule_table(owner);
        let query = format!("DELETE FROM {table} WHERE id = $1 AND {key} = $2");
        let result = sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule rule {} not found", id)));
        }
        Ok(())
    }

    // ---- Closed periods ----

    /// List the owner's closed periods
    pub async fn list_periods(&self, owner: ScheduleOwner) -> AppResult<Vec<ClosedPeriod>> {
        let (table, key, cols, id) = Self::period_table(owner);
        let query = format!(
            "SELECT {cols} FROM {table} WHERE {key} = $1 ORDER BY start_datetime, end_datetime"
        );
        let rows = sqlx::query_as::<_, ClosedPeriod>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Enabled closed periods overlapping `[start, end)`
    pub async fn closed_periods_between(
        &self,
        owner: ScheduleOwner,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<ClosedPeriod>> {
        let (table, key, cols, id) = Self::period_table(owner);
        let query = format!(
            "SELECT {cols} FROM {table} \
             WHERE {key} = $1 AND is_enabled \
               AND start_datetime < $2 AND end_datetime > $3 \
             ORDER BY start_datetime, end_datetime"
        );
        let rows = sqlx::query_as::<_, ClosedPeriod>(&query)
            .bind(id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Count enabled periods of the same owner overlapping the interval
    pub async fn count_overlapping_periods(
        &self,
        owner: ScheduleOwner,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> AppResult<i64> {
        let (table, key, _, id) = Self::period_table(owner);
        let query = format!(
            "SELECT COUNT(*) FROM {table} \
             WHERE {key} = $1 AND is_enabled \
               AND start_datetime < $2 AND end_datetime > $3 \
               AND ($4::int IS NULL OR id != $4)"
        );
        let count = sqlx::query_scalar(&query)
            .bind(id)
            .bind(end)
            .bind(start)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Create a closed period
    pub async fn create_period(
        &self,
        owner: ScheduleOwner,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        is_enabled: bool,
    ) -> AppResult<ClosedPeriod> {
        let (table, key, cols, id) = Self::period_table(owner);
        let query = format!(
            "INSERT INTO {table} ({key}, start_datetime, end_datetime, is_enabled) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {cols}"
        );
        let row = sqlx::query_as::<_, ClosedPeriod>(&query)
            .bind(id)
            .bind(start)
            .bind(end)
            .bind(is_enabled)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a closed period
    pub async fn delete_period(&self, owner: ScheduleOwner, id: i32) -> AppResult<()> {
        let (table, key, _, owner_id) = Self::period_table(owner);
        let query = format!("DELETE FROM {table} WHERE id = $1 AND {key} = $2");
        let result = sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Closed period {} not found", id)));
        }
        Ok(())
    }
}

//! Schedules service (weekly rules and closed periods for both owners)
//!
//! Every successful mutation enqueues a regeneration for the owner, so the
//! stored slots always catch up with the schedule material.

use chrono::{NaiveTime, Timelike};

use crate::{
    clock::SharedClock,
    config::ScheduleConfig,
    error::{AppError, AppResult},
    models::schedule::{ClosedPeriod, CreateClosedPeriod, CreateScheduleRule, ScheduleOwner, ScheduleRule},
    repository::Repository,
};

use super::regeneration::{RegenKey, RegenerationQueue};

#[derive(Clone)]
pub struct SchedulesService {
    repository: Repository,
    config: ScheduleConfig,
    clock: SharedClock,
    queue: RegenerationQueue,
}

impl SchedulesService {
    pub fn new(
        repository: Repository,
        config: ScheduleConfig,
        clock: SharedClock,
        queue: RegenerationQueue,
    ) -> Self {
        Self {
            repository,
            config,
            clock,
            queue,
        }
    }

    // ---- Rules ----

    pub async fn list_rules(&self, owner: ScheduleOwner) -> AppResult<Vec<ScheduleRule>> {
        self.check_owner(owner).await?;
        self.repository.schedules.list_rules(owner).await
    }

    /// Create a weekly rule after checking the time grid, the interval, and
    /// overlaps with the owner's other enabled rules.
    pub async fn create_rule(
        &self,
        owner: ScheduleOwner,
        data: &CreateScheduleRule,
    ) -> AppResult<ScheduleRule> {
        self.check_owner(owner).await?;

        if !(0..=6).contains(&data.day_of_week) {
            return Err(AppError::Validation(
                "The day of week must be between 0 and 6".to_string(),
            ));
        }

        let start_time = self.parse_time(data.start_time.as_deref(), self.config.start_time)?;
        let end_time = self.parse_time(data.end_time.as_deref(), self.config.end_time)?;
        self.validate_time_grid(start_time)?;
        self.validate_time_grid(end_time)?;
        if start_time >= end_time {
            return Err(AppError::Validation("The interval is incorrect".to_string()));
        }

        let timezone = data.timezone.as_deref().unwrap_or("UTC");
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AppError::Validation(format!("Invalid timezone {}", timezone)));
        }

        if data.is_enabled {
            let overlapping = self
                .repository
                .schedules
                .count_overlapping_rules(owner, data.day_of_week, start_time, end_time, None)
                .await?;
            if overlapping > 0 {
                return Err(AppError::Validation(
                    "Time intervals should not overlap".to_string(),
                ));
            }
        }

        let rule = self
            .repository
            .schedules
            .create_rule(
                owner,
                data.day_of_week,
                start_time,
                end_time,
                timezone,
                data.is_enabled,
            )
            .await?;
        self.trigger(owner);
        Ok(rule)
    }

    pub async fn delete_rule(&self, owner: ScheduleOwner, id: i32) -> AppResult<()> {
        self.repository.schedules.delete_rule(owner, id).await?;
        self.trigger(owner);
        Ok(())
    }

    // ---- Closed periods ----

    pub async fn list_periods(&self, owner: ScheduleOwner) -> AppResult<Vec<ClosedPeriod>> {
        self.check_owner(owner).await?;
        self.repository.schedules.list_periods(owner).await
    }

    /// Create a closed period; both instants must lie in the future and
    /// enabled periods of one owner may not overlap.
    pub async fn create_period(
        &self,
        owner: ScheduleOwner,
        data: &CreateClosedPeriod,
    ) -> AppResult<ClosedPeriod> {
        self.check_owner(owner).await?;

        let now = self.clock.now_utc();
        if data.start_datetime <= now || data.end_datetime <= now {
            return Err(AppError::Validation(
                "The datetime must be in the future".to_string(),
            ));
        }
        if data.start_datetime >= data.end_datetime {
            return Err(AppError::Validation("The interval is incorrect".to_string()));
        }

        if data.is_enabled {
            let overlapping = self
                .repository
                .schedules
                .count_overlapping_periods(owner, data.start_datetime, data.end_datetime, None)
                .await?;
            if overlapping > 0 {
                return Err(AppError::Validation(
                    "Datetime intervals should not overlap".to_string(),
                ));
            }
        }

        let period = self
            .repository
            .schedules
            .create_period(owner, data.start_datetime, data.end_datetime, data.is_enabled)
            .await?;
        self.trigger(owner);
        Ok(period)
    }

    pub async fn delete_period(&self, owner: ScheduleOwner, id: i32) -> AppResult<()> {
        self.repository.schedules.delete_period(owner, id).await?;
        self.trigger(owner);
        Ok(())
    }

    // ---- Helpers ----

    async fn check_owner(&self, owner: ScheduleOwner) -> AppResult<()> {
        match owner {
            ScheduleOwner::Professional(id) => {
                self.repository.professionals.get_by_id(id).await?;
            }
            ScheduleOwner::Service(id) => {
                self.repository.services.get_by_id(id).await?;
            }
        }
        Ok(())
    }

    fn trigger(&self, owner: ScheduleOwner) {
        let key = match owner {
            ScheduleOwner::Professional(id) => RegenKey::Professional(id),
            ScheduleOwner::Service(id) => RegenKey::Service(id),
        };
        self.queue
            .enqueue(key, crate::availability::RequestMode::Year);
    }

    fn parse_time(&self, value: Option<&str>, default: NaiveTime) -> AppResult<NaiveTime> {
        match value {
            None => Ok(default),
            Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M")
                .map_err(|_| AppError::Validation("Invalid time (use HH:MM)".to_string())),
        }
    }

    fn validate_time_grid(&self, time: NaiveTime) -> AppResult<()> {
        if !time_on_grid(time, self.config.minimal_time_span) {
            return Err(AppError::Validation(format!(
                "The minimal time interval is {}",
                self.config.minimal_time_span
            )));
        }
        Ok(())
    }
}

/// Times must land on the configured minute grid with zero seconds;
/// 23:59 is exempt as the end-of-day sentinel.
fn time_on_grid(time: NaiveTime, span: u32) -> bool {
    if time.hour() == 23 && time.minute() == 59 {
        return true;
    }
    time.second() == 0 && time.nanosecond() == 0 && time.minute() % span == 0
}

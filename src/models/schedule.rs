//! Schedule models (weekly rules, closed periods, availability slots)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::interval::Interval;

/// Day-of-week index used by schedule rules: 0 = Monday .. 6 = Sunday.
pub fn weekday_index(date: NaiveDate) -> i16 {
    use chrono::Datelike;
    date.weekday().num_days_from_monday() as i16
}

/// Owner of schedule material: rules, closed periods, and slots are keyed
/// either by a professional or by a specific service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleOwner {
    Professional(i32),
    Service(i32),
}

impl std::fmt::Display for ScheduleOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleOwner::Professional(id) => write!(f, "professional {}", id),
            ScheduleOwner::Service(id) => write!(f, "service {}", id),
        }
    }
}

// ---------------------------------------------------------------------------
// ScheduleRule
// ---------------------------------------------------------------------------

/// A weekly schedule rule owned by either a professional or a service.
///
/// Exactly one of `professional_id` / `service_id` is set; the repository
/// queries keep the shape uniform so the generator never inspects the owner
/// kind.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleRule {
    pub id: i32,
    pub professional_id: Option<i32>,
    pub service_id: Option<i32>,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: i16,
    /// Local wall-clock start
    pub start_time: NaiveTime,
    /// Local wall-clock end
    pub end_time: NaiveTime,
    /// IANA zone name the times are expressed in
    pub timezone: String,
    pub is_enabled: bool,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl ScheduleRule {
    /// Parse the stored zone name.
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid timezone {}", self.timezone)))
    }
}

/// Create schedule rule request. Times default to the configured
/// schedule start/end when omitted.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleRule {
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: i16,
    /// Start time (HH:MM)
    pub start_time: Option<String>,
    /// End time (HH:MM)
    pub end_time: Option<String>,
    /// IANA zone name; defaults to UTC
    pub timezone: Option<String>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

// ---------------------------------------------------------------------------
// ClosedPeriod
// ---------------------------------------------------------------------------

/// An explicit blackout interval subtracted from generated availability
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClosedPeriod {
    pub id: i32,
    pub professional_id: Option<i32>,
    pub service_id: Option<i32>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub is_enabled: bool,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl ClosedPeriod {
    pub fn interval(&self) -> Option<Interval> {
        Interval::new(self.start_datetime, self.end_datetime)
    }
}

/// Create closed period request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClosedPeriod {
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

// ---------------------------------------------------------------------------
// AvailabilitySlot
// ---------------------------------------------------------------------------

/// A stored bookable window, UTC half-open `[start, end)`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailabilitySlot {
    pub id: i64,
    pub professional_id: i32,
    /// Set when the slot is bound to a non-base-schedule service
    pub service_id: Option<i32>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

impl AvailabilitySlot {
    pub fn interval(&self) -> Option<Interval> {
        Interval::new(self.start_datetime, self.end_datetime)
    }
}

/// A generated slot not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAvailabilitySlot {
    pub professional_id: i32,
    pub service_id: Option<i32>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

impl NewAvailabilitySlot {
    pub fn interval(&self) -> Option<Interval> {
        Interval::new(self.start_datetime, self.end_datetime)
    }

    /// Rebuild the slot with a different interval, keeping its owner.
    pub fn with_interval(&self, interval: Interval) -> Self {
        Self {
            professional_id: self.professional_id,
            service_id: self.service_id,
            start_datetime: interval.start(),
            end_datetime: interval.end(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_index_monday_first() {
        // 2024-01-01 is a Monday
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 0);
        // 2024-03-10 is a Sunday
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()), 6);
    }

    #[test]
    fn test_rule_tz_parsing() {
        let mut rule = ScheduleRule {
            id: 1,
            professional_id: Some(1),
            service_id: None,
            day_of_week: 0,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            timezone: "America/New_York".to_string(),
            is_enabled: true,
            crea_date: None,
            modif_date: None,
        };
        assert_eq!(rule.tz().unwrap(), chrono_tz::America::New_York);
        rule.timezone = "Not/AZone".to_string();
        assert!(rule.tz().is_err());
    }
}

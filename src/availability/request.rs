//! Availability generation requests
//!
//! A raw request names a professional or a service and an optional window;
//! the processor fills mode-dependent defaults, snaps the window to midnight
//! UTC, resolves the professional from the service, and validates the
//! result. Any failure aborts the pipeline.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::{
    clock::{midnight_utc, SharedClock},
    config::AvailabilityConfig,
    error::{AppError, AppResult},
    models::{schedule::ScheduleOwner, service::Service},
};

/// How the window defaults are filled when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// One-year horizon starting today
    #[default]
    Year,
    /// A few days appended past the one-year horizon
    Append,
}

/// A raw availability-generation request
#[derive(Debug, Clone)]
pub struct Request {
    pub professional_id: Option<i32>,
    pub service: Option<Service>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub mode: RequestMode,
}

impl Request {
    pub fn for_professional(professional_id: i32) -> Self {
        Self {
            professional_id: Some(professional_id),
            service: None,
            start_datetime: None,
            end_datetime: None,
            mode: RequestMode::Year,
        }
    }

    pub fn for_service(service: Service) -> Self {
        Self {
            professional_id: None,
            service: Some(service),
            start_datetime: None,
            end_datetime: None,
            mode: RequestMode::Year,
        }
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_datetime = Some(start);
        self.end_datetime = Some(end);
        self
    }
}

/// A normalised, validated request
#[derive(Debug, Clone)]
pub struct ProcessedRequest {
    pub professional_id: i32,
    pub service: Option<Service>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

impl ProcessedRequest {
    /// The schedule owner the generator expands: the service when it keeps
    /// its own schedule, the professional otherwise.
    pub fn target(&self) -> ScheduleOwner {
        match &self.service {
            Some(service) if !service.is_base_schedule => ScheduleOwner::Service(service.id),
            _ => ScheduleOwner::Professional(self.professional_id),
        }
    }

    /// The service id generated slots are bound to, if any.
    pub fn service_binding(&self) -> Option<i32> {
        match &self.service {
            Some(service) if !service.is_base_schedule => Some(service.id),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProcessedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "professional {} service {:?}: {}-{}",
            self.professional_id,
            self.service.as_ref().map(|s| s.id),
            self.start_datetime,
            self.end_datetime,
        )
    }
}

/// Normalises and validates raw requests
pub struct RequestProcessor {
    clock: SharedClock,
    days_to_append: i64,
}

impl RequestProcessor {
    pub fn new(clock: SharedClock, config: &AvailabilityConfig) -> Self {
        Self {
            clock,
            days_to_append: config.days_to_append,
        }
    }

    pub fn process(&self, request: Request) -> AppResult<ProcessedRequest> {
        let (default_start, default_end) = self.default_window(request.mode);

        let start_datetime = midnight_utc(request.start_datetime.unwrap_or(default_start));
        let end_datetime = midnight_utc(request.end_datetime.unwrap_or(default_end));

        // a request naming only a service targets its professional
        let professional_id = request
            .professional_id
            .or_else(|| request.service.as_ref().map(|s| s.professional_id))
            .ok_or_else(|| {
                AppError::Availability("The request professional is empty".to_string())
            })?;

        if start_datetime > end_datetime {
            return Err(AppError::Availability(
                "The start datetime must be less than the end datetime".to_string(),
            ));
        }
        if let Some(service) = &request.service {
            if service.professional_id != professional_id {
                return Err(AppError::Availability(
                    "The request service is incorrect".to_string(),
                ));
            }
        }

        Ok(ProcessedRequest {
            professional_id,
            service: request.service,
            start_datetime,
            end_datetime,
        })
    }

    fn default_window(&self, mode: RequestMode) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = midnight_utc(self.clock.now_utc());
        let next_year = shift_years(today, 1);
        match mode {
            RequestMode::Year => (today, next_year),
            RequestMode::Append => (next_year, next_year + Duration::days(self.days_to_append)),
        }
    }
}

/// Add whole years, clamping Feb 29 to Feb 28 when the target year is not
/// a leap year.
fn shift_years(instant: DateTime<Utc>, years: i32) -> DateTime<Utc> {
    instant
        .with_year(instant.year() + years)
        .unwrap_or_else(|| {
            (instant - Duration::days(1))
                .with_year(instant.year() + years)
                .expect("Feb 28 exists in every year")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::enums::ServiceType;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn service(id: i32, professional_id: i32, is_base_schedule: bool) -> Service {
        Service {
            id,
            professional_id,
            name: "Haircut".to_string(),
            description: None,
            duration: 60,
            service_type: ServiceType::Online,
            is_base_schedule,
            is_auto_order_confirmation: true,
            is_enabled: true,
            crea_date: None,
            modif_date: None,
        }
    }

    fn processor(now: DateTime<Utc>) -> RequestProcessor {
        RequestProcessor::new(Arc::new(FixedClock(now)), &AvailabilityConfig::default())
    }

    #[test]
    fn test_year_mode_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 13, 45, 12).unwrap();
        let processed = processor(now)
            .process(Request::for_professional(7))
            .unwrap();
        assert_eq!(
            processed.start_datetime,
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            processed.end_datetime,
            Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_append_mode_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 13, 45, 12).unwrap();
        let processed = processor(now)
            .process(Request::for_professional(7).with_mode(RequestMode::Append))
            .unwrap();
        assert_eq!(
            processed.start_datetime,
            Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            processed.end_datetime,
            Utc.with_ymd_and_hms(2025, 6, 18, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_explicit_window_snaps_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let processed = processor(now)
            .process(Request::for_professional(7).with_window(
                Utc.with_ymd_and_hms(2024, 7, 1, 10, 30, 5).unwrap(),
                Utc.with_ymd_and_hms(2024, 7, 2, 23, 59, 59).unwrap(),
            ))
            .unwrap();
        assert_eq!(
            processed.start_datetime,
            Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            processed.end_datetime,
            Utc.with_ymd_and_hms(2024, 7, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_professional_resolved_from_service() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let processed = processor(now)
            .process(Request::for_service(service(3, 7, false)))
            .unwrap();
        assert_eq!(processed.professional_id, 7);
        assert_eq!(processed.target(), ScheduleOwner::Service(3));
        assert_eq!(processed.service_binding(), Some(3));
    }

    #[test]
    fn test_base_schedule_service_targets_professional() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let processed = processor(now)
            .process(Request::for_service(service(3, 7, true)))
            .unwrap();
        assert_eq!(processed.target(), ScheduleOwner::Professional(7));
        assert_eq!(processed.service_binding(), None);
    }

    #[test]
    fn test_missing_professional_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let request = Request {
            professional_id: None,
            service: None,
            start_datetime: None,
            end_datetime: None,
            mode: RequestMode::Year,
        };
        assert!(processor(now).process(request).is_err());
    }

    #[test]
    fn test_reversed_window_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let request = Request::for_professional(7).with_window(
            Utc.with_ymd_and_hms(2024, 7, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
        );
        assert!(processor(now).process(request).is_err());
    }

    #[test]
    fn test_foreign_service_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let mut request = Request::for_service(service(3, 7, false));
        request.professional_id = Some(8);
        assert!(processor(now).process(request).is_err());
    }
}

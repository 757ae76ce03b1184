//! Calendar read requests
//!
//! The read path serves raw availability slots for a professional or one of
//! their services over a UTC window. The requested period granularity is
//! advisory; grouping is left to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::CalendarPeriod,
        schedule::AvailabilitySlot,
        service::Service,
    },
};

/// A validated calendar query
#[derive(Debug, Clone)]
pub struct CalendarRequest {
    pub professional_id: i32,
    pub service: Option<Service>,
    pub period: CalendarPeriod,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

impl CalendarRequest {
    /// Validate the window and the professional/service coherence.
    pub fn validate(&self) -> AppResult<()> {
        if self.start_datetime >= self.end_datetime {
            return Err(AppError::Calendar(
                "The start datetime must be less than the end datetime.".to_string(),
            ));
        }
        if let Some(service) = &self.service {
            if service.professional_id != self.professional_id {
                return Err(AppError::Calendar(
                    "The request service is invalid".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The service id the listed slots are bound to; `None` targets the
    /// professional-level slots, including for base-schedule services.
    pub fn service_binding(&self) -> Option<i32> {
        match &self.service {
            Some(service) if !service.is_base_schedule => Some(service.id),
            _ => None,
        }
    }
}

/// One calendar entry on the wire
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarEntry {
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub professional: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<i32>,
}

impl From<AvailabilitySlot> for CalendarEntry {
    fn from(slot: AvailabilitySlot) -> Self {
        Self {
            start_datetime: slot.start_datetime,
            end_datetime: slot.end_datetime,
            professional: slot.professional_id,
            service: slot.service_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::ServiceType;
    use chrono::TimeZone;

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

    fn request(service: Option<Service>) -> CalendarRequest {
        CalendarRequest {
            professional_id: 7,
            service,
            period: CalendarPeriod::Day,
            start_datetime: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            end_datetime: Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request(None).validate().is_ok());
        assert!(request(Some(service(3, 7, false))).validate().is_ok());
    }

    #[test]
    fn test_reversed_window_rejected() {
        let mut req = request(None);
        req.end_datetime = req.start_datetime;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_foreign_service_rejected() {
        assert!(request(Some(service(3, 8, false))).validate().is_err());
    }

    #[test]
    fn test_service_binding_follows_base_schedule() {
        assert_eq!(request(Some(service(3, 7, false))).service_binding(), Some(3));
        assert_eq!(request(Some(service(3, 7, true))).service_binding(), None);
        assert_eq!(request(None).service_binding(), None);
    }
}

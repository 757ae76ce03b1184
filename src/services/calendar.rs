//! Calendar service (read-only slot queries)

use crate::{
    calendar::{CalendarEntry, CalendarRequest},
    error::{AppError, AppResult},
    models::enums::CalendarPeriod,
    repository::Repository,
};

#[derive(Clone)]
pub struct CalendarService {
    repository: Repository,
}

impl CalendarService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Serve the slots intersecting the requested window for the owner the
    /// request implies. The period granularity stays advisory; slot-level
    /// callers still need a resolvable minimum duration.
    pub async fn query(&self, request: CalendarRequest) -> AppResult<Vec<CalendarEntry>> {
        request.validate()?;

        if request.period == CalendarPeriod::Slot {
            let min_duration = match &request.service {
                Some(service) => service.duration,
                None => {
                    self.repository
                        .services
                        .min_duration(request.professional_id)
                        .await?
                }
            };
            if min_duration <= 0 {
                return Err(AppError::Calendar("The min duration is empty".to_string()));
            }
        }

        let slots = self
            .repository
            .slots
            .get_between(
                request.professional_id,
                request.service_binding(),
                request.start_datetime,
                request.end_datetime,
            )
            .await?;
        Ok(slots.into_iter().map(CalendarEntry::from).collect())
    }
}

//! Restriction pipeline
//!
//! Generated slots pass through a chain of handlers before being saved.
//! Handlers read but never write; each must preserve the slot invariants.
//! The built-in handler subtracts closed periods.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    interval::Interval,
    models::schedule::{NewAvailabilitySlot, ScheduleOwner},
    repository::schedules::SchedulesRepository,
};

use super::request::ProcessedRequest;

/// A single restriction handler; handlers compose by appending to the chain.
#[async_trait]
pub trait Restriction: Send + Sync {
    async fn apply(
        &self,
        request: &ProcessedRequest,
        slots: Vec<NewAvailabilitySlot>,
    ) -> AppResult<Vec<NewAvailabilitySlot>>;
}

/// Subtracts enabled closed periods from the generated slots.
///
/// Service-bound slots are checked against the service's closed periods,
/// professional-level slots against the professional's. Each set is loaded
/// at most once per run, on first use.
pub struct ClosedPeriodsRestriction {
    schedules: SchedulesRepository,
}

impl ClosedPeriodsRestriction {
    pub fn new(schedules: SchedulesRepository) -> Self {
        Self { schedules }
    }

    async fn load_periods(
        &self,
        request: &ProcessedRequest,
        owner: ScheduleOwner,
    ) -> AppResult<Vec<Interval>> {
        let periods = self
            .schedules
            .closed_periods_between(owner, request.start_datetime, request.end_datetime)
            .await?;
        Ok(periods.iter().filter_map(|p| p.interval()).collect())
    }
}

#[async_trait]
impl Restriction for ClosedPeriodsRestriction {
    async fn apply(
        &self,
        request: &ProcessedRequest,
        slots: Vec<NewAvailabilitySlot>,
    ) -> AppResult<Vec<NewAvailabilitySlot>> {
        if slots.is_empty() {
            return Ok(slots);
        }

        let mut professional_periods: Option<Vec<Interval>> = None;
        let mut service_periods: Option<Vec<Interval>> = None;
        let mut processed: Vec<NewAvailabilitySlot> = Vec::with_capacity(slots.len());

        for slot in slots {
            let periods = match slot.service_id {
                Some(service_id) => {
                    if service_periods.is_none() {
                        service_periods = Some(
                            self.load_periods(request, ScheduleOwner::Service(service_id))
                                .await?,
                        );
                    }
                    service_periods.as_deref().unwrap()
                }
                None => {
                    if professional_periods.is_none() {
                        professional_periods = Some(
                            self.load_periods(
                                request,
                                ScheduleOwner::Professional(slot.professional_id),
                            )
                            .await?,
                        );
                    }
                    professional_periods.as_deref().unwrap()
                }
            };
            processed.extend(subtract_periods(&slot, periods));
        }
        Ok(processed)
    }
}

/// Apply every closed interval to one slot, yielding its residual pieces.
pub(crate) fn subtract_periods(
    slot: &NewAvailabilitySlot,
    periods: &[Interval],
) -> Vec<NewAvailabilitySlot> {
    let Some(interval) = slot.interval() else {
        return Vec::new();
    };

    let mut residual = vec![interval];
    for period in periods {
        residual = residual
            .into_iter()
            .flat_map(|piece| piece.subtract(period))
            .collect();
        if residual.is_empty() {
            break;
        }
    }
    residual
        .into_iter()
        .map(|piece| slot.with_interval(piece))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn slot(start: DateTime<Utc>, end: DateTime<Utc>) -> NewAvailabilitySlot {
        NewAvailabilitySlot {
            professional_id: 1,
            service_id: None,
            start_datetime: start,
            end_datetime: end,
        }
    }

    #[test]
    fn test_closed_period_splits_the_slot() {
        // slot 06-01..06-20 minus closed 06-05..06-10 -> [06-01, 06-05) and
        // [06-10, 06-20)
        let s = slot(utc(2024, 6, 1, 0), utc(2024, 6, 20, 0));
        let closed = vec![Interval::new(utc(2024, 6, 5, 0), utc(2024, 6, 10, 0)).unwrap()];
        let pieces = subtract_periods(&s, &closed);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].start_datetime, utc(2024, 6, 1, 0));
        assert_eq!(pieces[0].end_datetime, utc(2024, 6, 5, 0));
        assert_eq!(pieces[1].start_datetime, utc(2024, 6, 10, 0));
        assert_eq!(pieces[1].end_datetime, utc(2024, 6, 20, 0));
    }

    #[test]
    fn test_covering_period_drops_the_slot() {
        let s = slot(utc(2024, 6, 5, 9), utc(2024, 6, 5, 18));
        let closed = vec![Interval::new(utc(2024, 6, 5, 0), utc(2024, 6, 6, 0)).unwrap()];
        assert!(subtract_periods(&s, &closed).is_empty());
    }

    #[test]
    fn test_period_trims_head_and_tail() {
        let s = slot(utc(2024, 6, 5, 9), utc(2024, 6, 5, 18));
        let closed = vec![
            Interval::new(utc(2024, 6, 5, 8), utc(2024, 6, 5, 10)).unwrap(),
            Interval::new(utc(2024, 6, 5, 17), utc(2024, 6, 5, 20)).unwrap(),
        ];
        let pieces = subtract_periods(&s, &closed);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].start_datetime, utc(2024, 6, 5, 10));
        assert_eq!(pieces[0].end_datetime, utc(2024, 6, 5, 17));
    }

    #[test]
    fn test_no_periods_passes_through() {
        let s = slot(utc(2024, 6, 5, 9), utc(2024, 6, 5, 18));
        let pieces = subtract_periods(&s, &[]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].start_datetime, s.start_datetime);
        assert_eq!(pieces[0].end_datetime, s.end_datetime);
    }

    #[test]
    fn test_residual_pieces_never_touch_closed_periods() {
        let s = slot(utc(2024, 6, 1, 0), utc(2024, 6, 30, 0));
        let closed = vec![
            Interval::new(utc(2024, 6, 3, 0), utc(2024, 6, 4, 0)).unwrap(),
            Interval::new(utc(2024, 6, 10, 12), utc(2024, 6, 12, 12)).unwrap(),
            Interval::new(utc(2024, 6, 29, 0), utc(2024, 7, 2, 0)).unwrap(),
        ];
        let pieces = subtract_periods(&s, &closed);
        for piece in &pieces {
            let interval = piece.interval().unwrap();
            for period in &closed {
                assert!(!interval.overlaps(period));
            }
        }
        // total residual time is the slot minus the contained closed time
        let total: i64 = pieces
            .iter()
            .map(|p| (p.end_datetime - p.start_datetime).num_hours())
            .sum();
        // 29 days minus 24h, minus 48h, minus 24h (only 06-29..06-30 inside)
        assert_eq!(total, 29 * 24 - 24 - 48 - 24);
    }
}

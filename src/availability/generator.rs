//! Slot generator
//!
//! Expands weekly schedule rules across the requested date range. Rule times
//! are wall-clock in the rule's declared zone; conversion to UTC goes through
//! chrono-tz, which is the sole mechanism for DST correctness; offsets are
//! never added manually. Adjacent fragments are fused afterwards within a
//! small gap tolerance.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{
    error::AppResult,
    interval::{merge_adjacent, Interval},
    models::schedule::{weekday_index, NewAvailabilitySlot, ScheduleRule},
};

use super::request::ProcessedRequest;

pub struct SlotGenerator {
    gap_tolerance: Duration,
}

impl SlotGenerator {
    /// `gap_tolerance_secs` is the maximum gap between consecutive slots
    /// that still gets fused (config `availability.min_slot_diff_to_combine`).
    pub fn new(gap_tolerance_secs: i64) -> Self {
        Self {
            gap_tolerance: Duration::seconds(gap_tolerance_secs),
        }
    }

    /// Expand the rules over `[request.start, request.end]` (both endpoints
    /// included in the day iteration) and fuse adjacent fragments.
    pub fn generate(
        &self,
        request: &ProcessedRequest,
        rules_by_day: &BTreeMap<i16, Vec<ScheduleRule>>,
    ) -> AppResult<Vec<NewAvailabilitySlot>> {
        let professional_id = request.professional_id;
        let service_id = request.service_binding();

        let mut intervals: Vec<Interval> = Vec::new();
        let mut date = request.start_datetime.date_naive();
        let last = request.end_datetime.date_naive();

        while date <= last {
            if let Some(rules) = rules_by_day.get(&weekday_index(date)) {
                for rule in rules {
                    let tz = rule.tz()?;
                    let start = local_to_utc(tz, date, rule.start_time);
                    let end = local_to_utc(tz, date, rule.end_time);
                    match (start, end) {
                        (Some(start), Some(end)) => {
                            if let Some(interval) = Interval::new(start, end) {
                                intervals.push(interval);
                            }
                        }
                        _ => {
                            tracing::warn!(
                                "Skipping rule {} on {}: local time unresolvable in {}",
                                rule.id,
                                date,
                                rule.timezone,
                            );
                        }
                    }
                }
            }
            date = date + Duration::days(1);
        }

        let merged = merge_adjacent(intervals, self.gap_tolerance);
        Ok(merged
            .into_iter()
            .map(|interval| NewAvailabilitySlot {
                professional_id,
                service_id,
                start_datetime: interval.start(),
                end_datetime: interval.end(),
            })
            .collect())
    }
}

/// Resolve a local wall-clock time on a date to UTC.
///
/// An ambiguous local time (repeated during a backward transition) resolves
/// to its first occurrence. A nonexistent local time (skipped by a forward
/// transition) resolves to the first valid instant after the gap, probed on
/// the rule-time grid.
fn local_to_utc(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    use chrono::offset::LocalResult;

    let naive = NaiveDateTime::new(date, time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _) => Some(first.with_timezone(&Utc)),
        LocalResult::None => {
            let mut probe = naive;
            for _ in 0..8 {
                probe = probe + Duration::minutes(15);
                if let Some(local) = tz.from_local_datetime(&probe).earliest() {
                    return Some(local.with_timezone(&Utc));
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use chrono::TimeZone;

    fn rule(
        id: i32,
        day_of_week: i16,
        start: (u32, u32),
        end: (u32, u32),
        timezone: &str,
    ) -> ScheduleRule {
        ScheduleRule {
            id,
            professional_id: Some(1),
            service_id: None,
            day_of_week,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            timezone: timezone.to_string(),
            is_enabled: true,
            crea_date: None,
            modif_date: None,
        }
    }

    fn by_day(rules: Vec<ScheduleRule>) -> BTreeMap<i16, Vec<ScheduleRule>> {
        let mut map: BTreeMap<i16, Vec<ScheduleRule>> = BTreeMap::new();
        for r in rules {
            map.entry(r.day_of_week).or_default().push(r);
        }
        map
    }

    fn request(start: DateTime<Utc>, end: DateTime<Utc>) -> ProcessedRequest {
        ProcessedRequest {
            professional_id: 1,
            service: None,
            start_datetime: start,
            end_datetime: end,
        }
    }

    #[test]
    fn test_simple_weekday_expansion() {
        // Monday 09:00-18:00 UTC, window covering a single Monday
        let rules = by_day(vec![rule(1, 0, (9, 0), (18, 0), "UTC")]);
        let req = request(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        let slots = SlotGenerator::new(70).generate(&req, &rules).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(
            slots[0].start_datetime,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(
            slots[0].end_datetime,
            Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap()
        );
        assert_eq!(slots[0].professional_id, 1);
        assert_eq!(slots[0].service_id, None);
    }

    #[test]
    fn test_dst_spring_forward_shortens_the_slot() {
        // Sunday 01:00-05:00 America/New_York across 2024-03-10, the
        // spring-forward Sunday: the UTC duration is 3 hours that day and
        // 4 hours on the adjacent Sundays.
        let rules = by_day(vec![rule(1, 6, (1, 0), (5, 0), "America/New_York")]);
        let req = request(
            Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 17, 0, 0, 0).unwrap(),
        );
        let slots = SlotGenerator::new(70).generate(&req, &rules).unwrap();
        assert_eq!(slots.len(), 3);
        let durations: Vec<i64> = slots
            .iter()
            .map(|s| (s.end_datetime - s.start_datetime).num_hours())
            .collect();
        assert_eq!(durations, vec![4, 3, 4]);
        // 01:00 EST on 2024-03-10 is 06:00 UTC; 05:00 EDT is 09:00 UTC
        assert_eq!(
            slots[1].start_datetime,
            Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap()
        );
        assert_eq!(
            slots[1].end_datetime,
            Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_adjacent_rules_fuse() {
        let rules = by_day(vec![
            rule(1, 0, (9, 0), (14, 0), "UTC"),
            rule(2, 0, (14, 0), (18, 0), "UTC"),
        ]);
        let req = request(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        let slots = SlotGenerator::new(70).generate(&req, &rules).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(
            slots[0].start_datetime,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(
            slots[0].end_datetime,
            Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_generated_slots_never_overlap() {
        // several rules across the week over a month-long window
        let rules = by_day(vec![
            rule(1, 0, (9, 0), (13, 0), "UTC"),
            rule(2, 0, (14, 0), (18, 0), "UTC"),
            rule(3, 2, (8, 0), (12, 0), "Europe/Paris"),
            rule(4, 4, (22, 0), (23, 45), "America/New_York"),
        ]);
        let req = request(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        );
        let slots = SlotGenerator::new(70).generate(&req, &rules).unwrap();
        assert!(!slots.is_empty());
        let intervals: Vec<Interval> = slots.iter().map(|s| s.interval().unwrap()).collect();
        for (i, a) in intervals.iter().enumerate() {
            for b in &intervals[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_generation_is_idempotent_under_merge() {
        let rules = by_day(vec![
            rule(1, 0, (9, 0), (14, 0), "UTC"),
            rule(2, 0, (14, 0), (18, 0), "UTC"),
        ]);
        let req = request(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        );
        let slots = SlotGenerator::new(70).generate(&req, &rules).unwrap();
        let intervals: Vec<Interval> = slots.iter().map(|s| s.interval().unwrap()).collect();
        let again = merge_adjacent(intervals.clone(), Duration::seconds(70));
        assert_eq!(intervals, again);
    }

    #[test]
    fn test_service_bound_slots_carry_the_service() {
        use crate::models::enums::ServiceType;
        use crate::models::service::Service;

        let service = Service {
            id: 9,
            professional_id: 1,
            name: "Massage".to_string(),
            description: None,
            duration: 30,
            service_type: ServiceType::ProfessionalLocation,
            is_base_schedule: false,
            is_auto_order_confirmation: true,
            is_enabled: true,
            crea_date: None,
            modif_date: None,
        };
        let req = ProcessedRequest {
            professional_id: 1,
            service: Some(service),
            start_datetime: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_datetime: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let rules = by_day(vec![rule(1, 0, (9, 0), (12, 0), "UTC")]);
        let slots = SlotGenerator::new(70).generate(&req, &rules).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].service_id, Some(9));
    }
}

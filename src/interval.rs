//! Half-open UTC interval algebra.
//!
//! Every interval is `[start, end)` with `start < end`. Touching endpoints
//! do not count as overlap, so a slot ending at 14:00 and one starting at
//! 14:00 are disjoint.

use chrono::{DateTime, Duration, Utc};

/// A half-open interval `[start, end)` over UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval; `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True if the intervals share at least one instant.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if `other` lies entirely within `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the instant lies within the interval.
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Subtract `other` from `self`, returning the remaining pieces.
    ///
    /// Yields zero, one, or two disjoint intervals whose union is
    /// `self \ other`; endpoints are preserved exactly.
    pub fn subtract(&self, other: &Interval) -> Vec<Interval> {
        // disjoint
        if !self.overlaps(other) {
            return vec![*self];
        }
        // fully covered
        if other.contains(self) {
            return vec![];
        }
        // strictly inside: split into head and tail
        if self.start < other.start && other.end < self.end {
            return vec![
                Interval {
                    start: self.start,
                    end: other.start,
                },
                Interval {
                    start: other.end,
                    end: self.end,
                },
            ];
        }
        // overlaps the head
        if other.start <= self.start {
            return vec![Interval {
                start: other.end,
                end: self.end,
            }];
        }
        // overlaps the tail
        vec![Interval {
            start: self.start,
            end: other.start,
        }]
    }
}

/// Fuse intervals whose gap does not exceed `gap_tolerance`.
///
/// The input is sorted by start; a single pass then extends the previous
/// interval whenever the next one starts within the tolerance of its end.
/// The tolerance absorbs trivial splits introduced by crossing midnight in
/// some zones while preserving real gaps.
pub fn merge_adjacent(mut intervals: Vec<Interval>, gap_tolerance: Duration) -> Vec<Interval> {
    if intervals.len() < 2 {
        return intervals;
    }
    intervals.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for current in intervals {
        match merged.last_mut() {
            Some(prev) if current.start - prev.end <= gap_tolerance => {
                if current.end > prev.end {
                    prev.end = current.end;
                }
            }
            _ => merged.push(current),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn iv(s: DateTime<Utc>, e: DateTime<Utc>) -> Interval {
        Interval::new(s, e).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_and_reversed() {
        let a = utc(2024, 6, 1, 10, 0);
        assert!(Interval::new(a, a).is_none());
        assert!(Interval::new(utc(2024, 6, 1, 11, 0), a).is_none());
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        let a = iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 14, 0));
        let b = iv(utc(2024, 6, 1, 14, 0), utc(2024, 6, 1, 18, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_overlaps_and_contains() {
        let a = iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 18, 0));
        let b = iv(utc(2024, 6, 1, 10, 0), utc(2024, 6, 1, 11, 0));
        let c = iv(utc(2024, 6, 1, 17, 0), utc(2024, 6, 1, 19, 0));
        assert!(a.overlaps(&b));
        assert!(a.contains(&b));
        assert!(a.overlaps(&c));
        assert!(!a.contains(&c));
        assert!(a.contains(&a));
    }

    #[test]
    fn test_subtract_disjoint() {
        let a = iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 12, 0));
        let c = iv(utc(2024, 6, 1, 12, 0), utc(2024, 6, 1, 13, 0));
        assert_eq!(a.subtract(&c), vec![a]);
    }

    #[test]
    fn test_subtract_covering() {
        let a = iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 12, 0));
        let c = iv(utc(2024, 6, 1, 8, 0), utc(2024, 6, 1, 12, 0));
        assert!(a.subtract(&c).is_empty());
        assert!(a.subtract(&a).is_empty());
    }

    #[test]
    fn test_subtract_trims_head() {
        let a = iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 12, 0));
        let c = iv(utc(2024, 6, 1, 8, 0), utc(2024, 6, 1, 10, 0));
        assert_eq!(
            a.subtract(&c),
            vec![iv(utc(2024, 6, 1, 10, 0), utc(2024, 6, 1, 12, 0))]
        );
    }

    #[test]
    fn test_subtract_trims_tail() {
        let a = iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 12, 0));
        let c = iv(utc(2024, 6, 1, 11, 0), utc(2024, 6, 1, 13, 0));
        assert_eq!(
            a.subtract(&c),
            vec![iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 11, 0))]
        );
    }

    #[test]
    fn test_subtract_splits() {
        // slot 06-01..06-20 minus closed 06-05..06-10 -> two slots
        let a = iv(utc(2024, 6, 1, 0, 0), utc(2024, 6, 20, 0, 0));
        let c = iv(utc(2024, 6, 5, 0, 0), utc(2024, 6, 10, 0, 0));
        let parts = a.subtract(&c);
        assert_eq!(
            parts,
            vec![
                iv(utc(2024, 6, 1, 0, 0), utc(2024, 6, 5, 0, 0)),
                iv(utc(2024, 6, 10, 0, 0), utc(2024, 6, 20, 0, 0)),
            ]
        );
        // the pieces are disjoint and do not touch the subtracted interval
        assert!(!parts[0].overlaps(&parts[1]));
        assert!(parts.iter().all(|p| !p.overlaps(&c)));
    }

    #[test]
    fn test_subtract_union_preserves_endpoints() {
        let a = iv(utc(2024, 6, 1, 9, 0), utc(2024, 6, 1, 18, 0));
        let c = iv(utc(2024, 6, 1, 12, 0), utc(2024, 6, 1, 13, 0));
        let parts = a.subtract(&c);
        assert_eq!(parts[0].start(), a.start());
        assert_eq!(parts[0].end(), c.start());
        assert_eq!(parts[1].start(), c.end());
        assert_eq!(parts[1].end(), a.end());
        let total: i64 = parts.iter().map(|p| p.duration().num_minutes()).sum();
        assert_eq!(total, (a.duration() - c.duration()).num_minutes());
    }

    #[test]
    fn test_merge_adjacent_fuses_within_tolerance() {
        let parts = vec![
            iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 14, 0)),
            iv(utc(2024, 1, 1, 14, 0), utc(2024, 1, 1, 18, 0)),
        ];
        let merged = merge_adjacent(parts, Duration::seconds(70));
        assert_eq!(
            merged,
            vec![iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 18, 0))]
        );
    }

    #[test]
    fn test_merge_adjacent_keeps_real_gaps() {
        let parts = vec![
            iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 12, 0)),
            iv(utc(2024, 1, 1, 12, 2, ), utc(2024, 1, 1, 18, 0)),
        ];
        let merged = merge_adjacent(parts.clone(), Duration::seconds(70));
        assert_eq!(merged, parts);
    }

    #[test]
    fn test_merge_adjacent_unsorted_chain() {
        let parts = vec![
            iv(utc(2024, 1, 1, 14, 0), utc(2024, 1, 1, 18, 0)),
            iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 14, 1)),
            iv(utc(2024, 1, 1, 18, 1), utc(2024, 1, 1, 20, 0)),
        ];
        let merged = merge_adjacent(parts, Duration::seconds(70));
        assert_eq!(
            merged,
            vec![iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 20, 0))]
        );
    }

    #[test]
    fn test_merge_adjacent_idempotent() {
        let parts = vec![
            iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 14, 0)),
            iv(utc(2024, 1, 1, 14, 0), utc(2024, 1, 1, 18, 0)),
            iv(utc(2024, 1, 2, 9, 0), utc(2024, 1, 2, 12, 0)),
        ];
        let once = merge_adjacent(parts, Duration::seconds(70));
        let twice = merge_adjacent(once.clone(), Duration::seconds(70));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_adjacent_contained_interval() {
        let parts = vec![
            iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 18, 0)),
            iv(utc(2024, 1, 1, 10, 0), utc(2024, 1, 1, 11, 0)),
        ];
        let merged = merge_adjacent(parts, Duration::seconds(0));
        assert_eq!(
            merged,
            vec![iv(utc(2024, 1, 1, 9, 0), utc(2024, 1, 1, 18, 0))]
        );
    }
}

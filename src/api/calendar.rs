//! Calendar API endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    calendar::{CalendarEntry, CalendarRequest},
    error::{AppError, AppResult},
    models::enums::CalendarPeriod,
};

/// Query parameters for the calendar endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// Professional ID
    pub professional: i32,
    /// Optional service ID
    pub service: Option<i32>,
    /// Period granularity (day or slot); advisory for aggregation
    pub period: Option<CalendarPeriod>,
    /// Window start (RFC 3339 or YYYY-MM-DDTHH:mm:ss, naive taken as UTC)
    pub start_datetime: String,
    /// Window end
    pub end_datetime: String,
}

/// List availability slots for a professional or service
#[utoipa::path(
    get,
    path = "/calendar",
    tag = "calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Availability slots", body = Vec<CalendarEntry>),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_calendar(
    State(state): State<crate::AppState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<CalendarEntry>>> {
    let start_datetime = parse_datetime(&query.start_datetime)
        .ok_or_else(|| AppError::Calendar("The request start datetime is invalid".to_string()))?;
    let end_datetime = parse_datetime(&query.end_datetime)
        .ok_or_else(|| AppError::Calendar("The request end datetime is invalid".to_string()))?;

    let service = match query.service {
        Some(id) => Some(state.services.catalog.get(id).await?),
        None => None,
    };

    let request = CalendarRequest {
        professional_id: query.professional,
        service,
        period: query.period.unwrap_or_default(),
        start_datetime,
        end_datetime,
    };
    let entries = state.services.calendar.query(request).await?;
    Ok(Json(entries))
}

/// Accept RFC 3339 or a naive `YYYY-MM-DDTHH:mm:ss`, converted to UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_datetime("2024-06-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let parsed = parse_datetime("2024-06-01T12:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2024-13-01T00:00:00").is_none());
    }
}

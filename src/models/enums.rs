//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// ServiceType
// ---------------------------------------------------------------------------

/// Where a service is performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Performed remotely
    Online,
    /// Performed at one of the professional's locations
    ProfessionalLocation,
    /// Performed at the client's location
    ClientLocation,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ServiceType::Online => "online",
            ServiceType::ProfessionalLocation => "professional_location",
            ServiceType::ClientLocation => "client_location",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Order lifecycle status.
///
/// `completed` is the only accepted spelling; anything else fails to
/// deserialize, so terminal-status checks cannot be skipped by a variant
/// spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    NotConfirmed,
    Confirmed,
    Paid,
    Completed,
    Canceled,
}

impl OrderStatus {
    /// Terminal statuses free their time window: they neither block other
    /// orders nor require an encompassing availability slot.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::NotConfirmed => "not_confirmed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Paid => "paid",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// CalendarPeriod
// ---------------------------------------------------------------------------

/// Granularity hint for calendar queries; advisory for downstream
/// aggregation, the core always returns raw slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalendarPeriod {
    Day,
    Slot,
}

impl Default for CalendarPeriod {
    fn default() -> Self {
        CalendarPeriod::Day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(!OrderStatus::NotConfirmed.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
    }

    #[test]
    fn test_status_spelling_is_completed() {
        let parsed: OrderStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, OrderStatus::Completed);
        // the legacy "complete" spelling is an error, not an alias
        assert!(serde_json::from_str::<OrderStatus>("\"complete\"").is_err());
    }

    #[test]
    fn test_service_type_roundtrip() {
        let parsed: ServiceType = serde_json::from_str("\"client_location\"").unwrap();
        assert_eq!(parsed, ServiceType::ClientLocation);
        assert_eq!(
            serde_json::to_string(&ServiceType::Online).unwrap(),
            "\"online\""
        );
    }
}

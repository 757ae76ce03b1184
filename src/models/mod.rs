//! Domain models and API data transfer objects

pub mod enums;
pub mod order;
pub mod professional;
pub mod schedule;
pub mod service;
pub mod user;

pub use enums::{CalendarPeriod, OrderStatus, ServiceType};
pub use order::{CreateOrder, NewOrder, Order, UpdateOrder};
pub use professional::Professional;
pub use schedule::{
    AvailabilitySlot, ClosedPeriod, CreateClosedPeriod, CreateScheduleRule, NewAvailabilitySlot,
    ScheduleOwner, ScheduleRule,
};
pub use service::{CreateService, Price, Service, ServiceLocation, UpdateService};
pub use user::{User, UserLocation};

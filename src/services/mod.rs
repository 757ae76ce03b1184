//! Business logic services

pub mod calendar;
pub mod catalog;
pub mod lock;
pub mod notifier;
pub mod orders;
pub mod regeneration;
pub mod schedules;
pub mod tasks;

use std::sync::Arc;
use std::time::Duration;

use crate::{
    availability::AvailabilityGenerator,
    clock::{SharedClock, SystemClock},
    config::AppConfig,
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub schedules: schedules::SchedulesService,
    pub catalog: catalog::CatalogService,
    pub orders: orders::OrdersService,
    pub calendar: calendar::CalendarService,
    pub regeneration: regeneration::RegenerationQueue,
    pub generator: Arc<AvailabilityGenerator>,
    pub lock: lock::DistributedLock,
    pub clock: SharedClock,
}

impl Services {
    /// Create all services with the given repository
    pub async fn new(
        repository: Repository,
        config: &AppConfig,
        lock: lock::DistributedLock,
    ) -> AppResult<Self> {
        let clock: SharedClock = Arc::new(SystemClock);
        let generator = Arc::new(AvailabilityGenerator::new(
            repository.clone(),
            &config.availability,
            clock.clone(),
        ));
        let regeneration = regeneration::RegenerationQueue::start(
            generator.clone(),
            Duration::from_secs(config.regeneration.task_timeout_secs),
        );
        let notifier: Arc<dyn notifier::Notifier> =
            Arc::new(notifier::EmailNotifier::new(config.email.clone()));

        Ok(Self {
            schedules: schedules::SchedulesService::new(
                repository.clone(),
                config.schedule.clone(),
                clock.clone(),
                regeneration.clone(),
            ),
            catalog: catalog::CatalogService::new(repository.clone(), regeneration.clone()),
            orders: orders::OrdersService::new(
                repository.clone(),
                config.booking.clone(),
                clock.clone(),
                notifier,
                regeneration.clone(),
            ),
            calendar: calendar::CalendarService::new(repository),
            regeneration,
            generator,
            lock,
            clock,
        })
    }
}

//! Availability generation
//!
//! The write path of the booking core: a request is normalised, expanded
//! into slots from the owner's weekly rules, restricted by closed periods,
//! and saved by atomically replacing the affected window.

pub mod generator;
pub mod request;
pub mod restrictions;

use crate::{
    clock::SharedClock,
    config::AvailabilityConfig,
    error::AppResult,
    models::order::Order,
    repository::Repository,
};

pub use generator::SlotGenerator;
pub use request::{ProcessedRequest, Request, RequestMode, RequestProcessor};
pub use restrictions::{ClosedPeriodsRestriction, Restriction};

/// Orchestrates process → generate → restrict → replace for one request.
pub struct AvailabilityGenerator {
    repository: Repository,
    processor: RequestProcessor,
    generator: SlotGenerator,
    restrictions: Vec<Box<dyn Restriction>>,
}

impl AvailabilityGenerator {
    pub fn new(repository: Repository, config: &AvailabilityConfig, clock: SharedClock) -> Self {
        let restrictions: Vec<Box<dyn Restriction>> = vec![Box::new(
            ClosedPeriodsRestriction::new(repository.schedules.clone()),
        )];
        Self {
            processor: RequestProcessor::new(clock, config),
            generator: SlotGenerator::new(config.min_slot_diff_to_combine),
            restrictions,
            repository,
        }
    }

    /// Run one regeneration end to end.
    pub async fn generate(&self, request: Request) -> AppResult<()> {
        let request = self.processor.process(request)?;
        let rules = self
            .repository
            .schedules
            .rules_by_day(request.target())
            .await?;

        let mut slots = self.generator.generate(&request, &rules)?;
        for restriction in &self.restrictions {
            slots = restriction.apply(&request, slots).await?;
        }

        self.repository
            .slots
            .replace(
                request.professional_id,
                request.service_binding(),
                request.start_datetime,
                request.end_datetime,
                &slots,
            )
            .await?;

        tracing::info!("Availability generated: {} ({} slots)", request, slots.len());
        Ok(())
    }

    /// Regenerate a professional's own slots.
    pub async fn generate_for_professional(
        &self,
        professional_id: i32,
        mode: RequestMode,
    ) -> AppResult<()> {
        self.generate(Request::for_professional(professional_id).with_mode(mode))
            .await
    }

    /// Regenerate a service's slots (or its professional's when the service
    /// uses the base schedule).
    pub async fn generate_for_service(&self, service_id: i32, mode: RequestMode) -> AppResult<()> {
        let service = self.repository.services.get_by_id(service_id).await?;
        self.generate(Request::for_service(service).with_mode(mode))
            .await
    }

    /// Regenerate availability affected by an order.
    pub async fn generate_for_order(&self, order: &Order) -> AppResult<()> {
        self.generate_for_service(order.service_id, RequestMode::Year)
            .await
    }
}

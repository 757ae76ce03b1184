//! Catalog service (marketplace services offered by professionals)

use crate::{
    error::{AppError, AppResult},
    models::service::{CreateService, Service, UpdateService},
    repository::Repository,
};

use super::regeneration::RegenerationQueue;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    queue: RegenerationQueue,
}

impl CatalogService {
    pub fn new(repository: Repository, queue: RegenerationQueue) -> Self {
        Self { repository, queue }
    }

    pub async fn get(&self, id: i32) -> AppResult<Service> {
        self.repository.services.get_by_id(id).await
    }

    /// Create a service; a service keeping its own schedule gets its slots
    /// generated right away.
    pub async fn create(&self, data: &CreateService) -> AppResult<Service> {
        self.repository
            .professionals
            .get_by_id(data.professional_id)
            .await?;
        if data.duration <= 0 {
            return Err(AppError::Validation(
                "The duration must be positive".to_string(),
            ));
        }

        let service = self.repository.services.create(data).await?;
        self.trigger(&service);
        Ok(service)
    }

    pub async fn update(&self, id: i32, data: &UpdateService) -> AppResult<Service> {
        if let Some(duration) = data.duration {
            if duration <= 0 {
                return Err(AppError::Validation(
                    "The duration must be positive".to_string(),
                ));
            }
        }

        let service = self.repository.services.update(id, data).await?;
        self.trigger(&service);
        Ok(service)
    }

    /// A saved service with its own schedule regenerates itself; a
    /// base-schedule one leans on the professional's slots, which a service
    /// save does not change.
    fn trigger(&self, service: &Service) {
        if !service.is_base_schedule {
            self.queue.enqueue_service(service.id);
        }
    }
}

//! Scheduled tasks
//!
//! Two daily jobs keep the slot material healthy: **append** extends every
//! professional's and every non-base-schedule service's horizon so it stays
//! one year ahead, and **purge** removes expired slots. Both take the
//! distributed lock so concurrent server instances do not run them twice.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    availability::{AvailabilityGenerator, RequestMode},
    clock::{midnight_utc, SharedClock},
    config::RegenerationConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

use super::lock::DistributedLock;

const APPEND_LOCK: &str = "generate_future_availability_slots";
const PURGE_LOCK: &str = "remove_expired_availability_slots";

pub struct ScheduledTasks {
    scheduler: JobScheduler,
}

struct TaskContext {
    repository: Repository,
    generator: Arc<AvailabilityGenerator>,
    lock: DistributedLock,
    clock: SharedClock,
    batch_timeout: Duration,
}

impl ScheduledTasks {
    /// Register and start the daily jobs.
    pub async fn start(
        repository: Repository,
        generator: Arc<AvailabilityGenerator>,
        lock: DistributedLock,
        clock: SharedClock,
        config: &RegenerationConfig,
    ) -> AppResult<Self> {
        #[allow(unused_mut)]
        let mut scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create scheduler: {}", e)))?;

        let context = Arc::new(TaskContext {
            repository,
            generator,
            lock,
            clock,
            batch_timeout: Duration::from_secs(config.batch_timeout_secs),
        });

        let append_context = context.clone();
        let append_job = Job::new_async(config.append_cron.as_str(), move |_, _| {
            let context = append_context.clone();
            Box::pin(async move {
                run_append(&context).await;
            })
        })
        .map_err(|e| AppError::Internal(format!("Invalid append cron: {}", e)))?;

        let purge_context = context.clone();
        let purge_job = Job::new_async(config.purge_cron.as_str(), move |_, _| {
            let context = purge_context.clone();
            Box::pin(async move {
                run_purge(&context).await;
            })
        })
        .map_err(|e| AppError::Internal(format!("Invalid purge cron: {}", e)))?;

        scheduler
            .add(append_job)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to add append job: {}", e)))?;
        scheduler
            .add(purge_job)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to add purge job: {}", e)))?;
        scheduler
            .start()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Scheduled tasks started");
        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }
}

/// Extend the horizon for every professional and every enabled service that
/// keeps its own schedule. Failures of one owner never stop the batch.
async fn run_append(context: &TaskContext) {
    let guard = match context
        .lock
        .try_acquire(APPEND_LOCK, &[], context.batch_timeout)
        .await
    {
        Ok(Some(guard)) => guard,
        Ok(None) => {
            tracing::info!("Append run skipped: already in progress");
            return;
        }
        Err(error) => {
            tracing::error!("Append run lock failure: {}", error);
            return;
        }
    };

    let run = async {
        let professionals = context.repository.professionals.list_for_generation().await?;
        for professional in &professionals {
            if let Err(error) = context
                .generator
                .generate_for_professional(professional.id, RequestMode::Append)
                .await
            {
                tracing::error!(
                    "Append failed for professional {}: {}",
                    professional.id,
                    error,
                );
            }
        }

        let services = context.repository.services.list_for_generation().await?;
        for service in &services {
            if let Err(error) = context
                .generator
                .generate_for_service(service.id, RequestMode::Append)
                .await
            {
                tracing::error!("Append failed for service {}: {}", service.id, error);
            }
        }
        Ok::<_, AppError>((professionals.len(), services.len()))
    };

    match tokio::time::timeout(context.batch_timeout, run).await {
        Ok(Ok((professionals, services))) => {
            tracing::info!(
                "Append run finished: {} professionals, {} services",
                professionals,
                services,
            );
        }
        Ok(Err(error)) => tracing::error!("Append run failed: {}", error),
        Err(_) => tracing::error!("Append run abandoned after {:?}", context.batch_timeout),
    }

    context.lock.release(guard).await;
}

/// Remove slots that ended before today's midnight.
async fn run_purge(context: &TaskContext) {
    let guard = match context
        .lock
        .try_acquire(PURGE_LOCK, &[], context.batch_timeout)
        .await
    {
        Ok(Some(guard)) => guard,
        Ok(None) => {
            tracing::info!("Purge run skipped: already in progress");
            return;
        }
        Err(error) => {
            tracing::error!("Purge run lock failure: {}", error);
            return;
        }
    };

    let today_midnight = midnight_utc(context.clock.now_utc());
    match context.repository.slots.delete_expired(today_midnight).await {
        Ok(count) => tracing::info!("Purge run finished: {} expired slots removed", count),
        Err(error) => tracing::error!("Purge run failed: {}", error),
    }

    context.lock.release(guard).await;
}

//! Regeneration queue
//!
//! Every mutation of schedule material enqueues a regeneration for the
//! affected owner. Jobs drain through a single worker task, so regenerations
//! for any given `(professional, service)` key are serialized; across keys
//! no ordering is promised. Each job runs under a soft time bound; on
//! timeout the job is abandoned without partial effects, since the atomic
//! replace has not committed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::{
    availability::{AvailabilityGenerator, RequestMode},
    models::order::Order,
};

/// The owner a regeneration is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegenKey {
    Professional(i32),
    Service(i32),
}

impl std::fmt::Display for RegenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegenKey::Professional(id) => write!(f, "professional {}", id),
            RegenKey::Service(id) => write!(f, "service {}", id),
        }
    }
}

#[derive(Clone)]
pub struct RegenerationQueue {
    tx: mpsc::UnboundedSender<(RegenKey, RequestMode)>,
}

impl RegenerationQueue {
    /// Spawn the worker and return the queue handle.
    pub fn start(generator: Arc<AvailabilityGenerator>, task_timeout: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<(RegenKey, RequestMode)>();

        tokio::spawn(async move {
            while let Some((key, mode)) = rx.recv().await {
                let run = async {
                    match key {
                        RegenKey::Professional(id) => {
                            generator.generate_for_professional(id, mode).await
                        }
                        RegenKey::Service(id) => generator.generate_for_service(id, mode).await,
                    }
                };
                match tokio::time::timeout(task_timeout, run).await {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        tracing::error!("Regeneration failed for {}: {}", key, error);
                    }
                    Err(_) => {
                        tracing::error!(
                            "Regeneration for {} abandoned after {:?}",
                            key,
                            task_timeout,
                        );
                    }
                }
            }
        });

        Self { tx }
    }

    /// Enqueue a regeneration; failures only happen at shutdown and are
    /// logged.
    pub fn enqueue(&self, key: RegenKey, mode: RequestMode) {
        if self.tx.send((key, mode)).is_err() {
            tracing::warn!("Regeneration queue closed; dropping job for {}", key);
        }
    }

    pub fn enqueue_professional(&self, professional_id: i32) {
        self.enqueue(RegenKey::Professional(professional_id), RequestMode::Year);
    }

    pub fn enqueue_service(&self, service_id: i32) {
        self.enqueue(RegenKey::Service(service_id), RequestMode::Year);
    }

    /// Regenerate availability affected by an order mutation.
    pub fn enqueue_for_order(&self, order: &Order) {
        self.enqueue(RegenKey::Service(order.service_id), RequestMode::Year);
    }
}

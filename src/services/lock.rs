//! Redis-backed distributed lock
//!
//! Scheduled jobs use this to avoid overlapping instances across processes.
//! Locks auto-release when their timeout elapses; release failures are
//! swallowed after logging.

use std::time::Duration;

use redis::{AsyncCommands, Client};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct DistributedLock {
    client: Client,
}

/// Proof of a held lock; pass it back to `release`.
pub struct LockGuard {
    key: String,
    token: String,
}

impl DistributedLock {
    /// Create the lock service and verify the Redis connection
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    /// Try to take the lock named by `name` and `keys`. Returns `None` when
    /// another holder owns it.
    pub async fn try_acquire(
        &self,
        name: &str,
        keys: &[&str],
        timeout: Duration,
    ) -> AppResult<Option<LockGuard>> {
        let key = Self::lock_key(name, keys);
        let token = Uuid::new_v4().to_string();

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let acquired: bool = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(timeout.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to acquire lock {}: {}", key, e)))?;

        if acquired {
            Ok(Some(LockGuard { key, token }))
        } else {
            Ok(None)
        }
    }

    /// Release a held lock. Only the owning token deletes the key, so a lock
    /// that already expired and was re-taken is left alone. Failures are
    /// logged and swallowed.
    pub async fn release(&self, guard: LockGuard) {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Failed to release lock {}: {}", guard.key, e);
                return;
            }
        };

        let current: Result<Option<String>, _> = conn.get(&guard.key).await;
        match current {
            Ok(Some(token)) if token == guard.token => {
                if let Err(e) = conn.del::<_, ()>(&guard.key).await {
                    tracing::warn!("Failed to release lock {}: {}", guard.key, e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to release lock {}: {}", guard.key, e);
            }
        }
    }

    fn lock_key(name: &str, keys: &[&str]) -> String {
        if keys.is_empty() {
            format!("lock:{}", name)
        } else {
            format!("lock:{}:{}", name, keys.join(":"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_shape() {
        assert_eq!(DistributedLock::lock_key("purge", &[]), "lock:purge");
        assert_eq!(
            DistributedLock::lock_key("generate", &["professional", "7"]),
            "lock:generate:professional:7"
        );
    }
}

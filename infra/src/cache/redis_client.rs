//! Redis cache client implementation
//!
//! This module provides a Redis client with a multiplexed connection, retry
//! logic and the TTL operations the revocation ledger needs: set with expiry,
//! existence check and delete.

use async_trait::async_trait;
use redis::{
    aio::MultiplexedConnection, AsyncCommands, Client, IntoConnectionInfo, RedisError,
    RedisResult,
};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use tw_core::errors::CacheError;
use tw_core::repositories::TtlCache;
use tw_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Upper bound for the exponential backoff between retries
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis cache client with retry logic
///
/// Cloning is cheap: clones share the same multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    /// Maximum number of attempts for operations
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Create a new Redis client using the retry settings from `config`
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use tw_infra::cache::RedisClient;
    /// use tw_shared::config::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379");
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let max_retries = config.max_retries;
        let retry_delay_ms = config.retry_delay_ms;
        Self::new_with_retry_config(config, max_retries, retry_delay_ms).await
    }

    /// Create a new Redis client with custom retry configuration
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    /// * `max_retries` - Maximum number of attempts (at least 1)
    /// * `retry_delay_ms` - Base delay between retries in milliseconds
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        let max_retries = max_retries.max(1);
        info!(
            "Creating Redis client with URL: {} (db {})",
            mask_url(&config.url),
            config.database
        );

        let mut connection_info = config.url.as_str().into_connection_info().map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;
        if config.database != 0 {
            connection_info.redis.db = i64::from(config.database);
        }

        let client = Client::open(connection_info).map_err(|e| {
            error!("Failed to open Redis client: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(
            client,
            max_retries,
            retry_delay_ms,
            config.connection_timeout,
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
        timeout_seconds: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;
        let limit = Duration::from_secs(timeout_seconds.max(1));

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let error = match timeout(limit, client.get_multiplexed_async_connection()).await {
                Ok(Ok(connection)) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Timeout(limit.as_secs()),
            };

            if attempts >= max_retries {
                error!(
                    "Failed to connect to Redis after {} attempts: {}",
                    attempts, error
                );
                return Err(error);
            }

            warn!(
                "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                attempts, max_retries, error, delay
            );
            sleep(Duration::from_millis(delay)).await;
            delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
        }
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Set a value with expiration time
    ///
    /// # Arguments
    /// * `key` - Cache key (the configured namespace is prepended)
    /// * `value` - Value to cache
    /// * `expiry_seconds` - Time to live in seconds
    ///
    /// # Returns
    /// * `Result<(), InfrastructureError>` - Success or error
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        let key = self.config.make_key(key);
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                let value = value.to_string();
                let expiry = expiry_seconds.max(1);

                Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry).await })
            })
            .await;

        match result {
            Ok(_) => {
                debug!("Successfully set key '{}'", key);
                Ok(())
            }
            Err(e) => {
                error!("Failed to set key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if a key exists in cache
    ///
    /// # Arguments
    /// * `key` - Cache key (the configured namespace is prepended)
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key exists
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.config.make_key(key);
        debug!("Checking if key '{}' exists", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();

                Box::pin(async move { conn.exists::<_, bool>(key).await })
            })
            .await;

        match result {
            Ok(exists) => {
                debug!("Key '{}' exists: {}", key, exists);
                Ok(exists)
            }
            Err(e) => {
                error!("Failed to check key '{}' existence: {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete a key from cache
    ///
    /// # Arguments
    /// * `key` - Cache key to delete (the configured namespace is prepended)
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key was deleted, false if not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.config.make_key(key);
        debug!("Deleting key '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();

                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await;

        match result {
            Ok(deleted_count) => {
                let deleted = deleted_count > 0;
                if deleted {
                    debug!("Successfully deleted key '{}'", key);
                } else {
                    debug!("Key '{}' was not found", key);
                }
                Ok(deleted)
            }
            Err(e) => {
                error!("Failed to delete key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Result<Option<i64>, InfrastructureError>` - TTL in seconds, None if key doesn't exist or has no expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let key = self.config.make_key(key);
        debug!("Getting TTL for key '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!("Failed to get TTL for key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if healthy, error otherwise
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move {
                    redis::cmd("PING")
                        .query_async::<_, String>(&mut conn)
                        .await
                })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!(
                    "Redis health check returned unexpected response: {}",
                    response
                );
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Retriable errors are retried with exponential backoff, capped at
    /// [`MAX_RETRY_DELAY_MS`] between attempts.
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(
            MultiplexedConnection,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl TtlCache for RedisClient {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        Ok(self.set_with_expiry(key, value, ttl_seconds).await?)
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.exists(key).await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(RedisClient::delete(self, key).await?)
    }

    // Prefix deletion would need a keyspace SCAN; keep the unsupported default.
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and the operation should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            if proto_end < at_pos {
                let proto = &url[..proto_end + 3];
                let host_part = &url[at_pos..];
                return format!("{}****{}", proto, host_part);
            }
        }
    }
    url.to_string()
}

//! Dispatch queue consumer.
//!
//! Notification ids arrive as text payloads on a Redis list, one payload
//! per dispatch. Each payload is one invocation: trim, parse the decimal
//! id, then hand it to the engine. A payload that does not parse fails the
//! invocation before any store access happens.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use sqlx::PgPool;

use herald_common::error::AppError;
use herald_common::types::RunOutcome;
use herald_mailer::MailTransport;

use crate::engine::DispatchEngine;

/// Parse a queue payload into a notification id.
pub fn parse_notification_id(payload: &str) -> Result<i64, AppError> {
    let trimmed = payload.trim();
    trimmed.parse::<i64>().map_err(|_| {
        AppError::Payload(format!(
            "expected a decimal notification id, got {:?}",
            trimmed
        ))
    })
}

/// Blocking consumer over the configured Redis list.
pub struct DispatchQueue {
    redis: ConnectionManager,
    queue: String,
}

impl DispatchQueue {
    pub fn new(redis: ConnectionManager, queue: impl Into<String>) -> Self {
        Self {
            redis,
            queue: queue.into(),
        }
    }

    /// Block until the next payload arrives.
    pub async fn next(&mut self) -> Result<String, AppError> {
        let (_list, payload): (String, String) = self.redis.blpop(&self.queue, 0.0).await?;
        Ok(payload)
    }
}

/// One queue invocation: parse the payload, then run the dispatch engine.
pub async fn handle_payload<T: MailTransport>(
    engine: &DispatchEngine<T>,
    pool: &PgPool,
    payload: &str,
) -> Result<RunOutcome, AppError> {
    let notification_id = parse_notification_id(payload)?;
    tracing::info!(notification_id, "Dispatch message received");

    engine.run(pool, notification_id).await
}

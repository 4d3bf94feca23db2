//! Notification store access — the loader and the single status write.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use herald_common::error::AppError;
use herald_common::types::{Attendee, Notification};

/// Store access for dispatch runs.
pub struct NotificationStore;

impl NotificationStore {
    /// Fetch the notification row by id. Zero or one row.
    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Notification>, AppError> {
        let notification: Option<Notification> = sqlx::query_as(
            "SELECT id, subject, message, status, completed_date FROM notification WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }

    /// Load the full attendee roster, unfiltered. Row order is whatever the
    /// store returns.
    pub async fn attendees(pool: &PgPool) -> Result<Vec<Attendee>, AppError> {
        let attendees: Vec<Attendee> = sqlx::query_as("SELECT email, first_name FROM attendee")
            .fetch_all(pool)
            .await?;

        Ok(attendees)
    }

    /// Write the final status and completion timestamp, keyed by the
    /// original id. One statement, one transaction; zero affected rows (id
    /// vanished between read and write) is not treated specially.
    pub async fn mark_completed(
        pool: &PgPool,
        id: i64,
        status: &str,
        completed_date: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE notification
            SET status = $1, completed_date = $2
            WHERE id = $3
            "#,
        )
        .bind(status)
        .bind(completed_date)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}

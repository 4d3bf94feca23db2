use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification record as stored in the `notification` table.
///
/// Created and populated upstream; read once per dispatch run. `status` and
/// `completed_date` start NULL and are written together, exactly once, when
/// a run finishes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub subject: String,
    pub message: String,
    pub status: Option<String>,
    pub completed_date: Option<DateTime<Utc>>,
}

/// A registered recipient.
///
/// Read-only to the dispatcher. The email address is assumed non-empty but
/// is not validated for format here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendee {
    pub email: String,
    pub first_name: String,
}

/// Outcome of a single delivery attempt. Never persisted; failed attempts
/// are logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transport accepted the message.
    Sent,
    /// The transport answered with a non-accepted status code.
    Rejected(u16),
    /// The transport call itself failed (network, auth, ...).
    Failed(String),
}

/// Aggregate result of one dispatch run, surfaced to the caller's log sink.
///
/// Invariant: `notified <= total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every delivery attempt was accepted.
    Completed { notified: usize },
    /// Some attempts failed; the status row was still written.
    Partial { notified: usize, total: usize },
    /// No notification row matched the id; nothing was written.
    NotFound,
}

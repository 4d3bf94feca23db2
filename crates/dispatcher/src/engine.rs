//! Dispatch engine — fans a notification out to every attendee and
//! reconciles the aggregate outcome into a single status write.
//!
//! For each attendee:
//! 1. Personalize the subject as `"{first_name}, {subject}"`; the body is
//!    sent verbatim
//! 2. Hand the message to the mail transport
//! 3. Classify the reply: accepted code, rejected code, or transport failure
//!
//! One bad recipient never blocks delivery to the rest: the loop always
//! reaches the end of the roster, and the status row is written exactly
//! once, after the last attempt.

use chrono::Utc;
use sqlx::PgPool;

use herald_common::error::AppError;
use herald_common::types::{Attendee, DispatchOutcome, Notification, RunOutcome};
use herald_mailer::{MailTransport, OutboundEmail};

use crate::store::NotificationStore;

/// Upstream status codes that count as a delivered send.
const ACCEPTED_STATUS: [u16; 2] = [200, 202];

/// Dispatch engine over an outbound mail transport.
pub struct DispatchEngine<T> {
    transport: T,
}

impl<T: MailTransport> DispatchEngine<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Run one dispatch: load the notification and roster, attempt delivery
    /// to every attendee, then write the status row.
    ///
    /// An unknown id ends the run cleanly with [`RunOutcome::NotFound`] and
    /// no status write. Store errors propagate to the caller; by then any
    /// already-attempted sends stand.
    pub async fn run(&self, pool: &PgPool, notification_id: i64) -> Result<RunOutcome, AppError> {
        let Some(notification) = NotificationStore::get(pool, notification_id).await? else {
            tracing::error!(notification_id, "No notification found");
            return Ok(RunOutcome::NotFound);
        };

        let attendees = NotificationStore::attendees(pool).await?;
        let total = attendees.len();

        let notified = self.dispatch_all(&notification, &attendees).await;

        NotificationStore::mark_completed(pool, notification_id, &status_text(notified), Utc::now())
            .await?;

        tracing::info!(notification_id, notified, total, "Notification updated");

        if notified == total {
            Ok(RunOutcome::Completed { notified })
        } else {
            Ok(RunOutcome::Partial { notified, total })
        }
    }

    /// Attempt delivery to every attendee, sequentially and in roster order,
    /// and return the number of accepted sends. Rejections and transport
    /// failures are logged per recipient and never interrupt the loop.
    pub async fn dispatch_all(&self, notification: &Notification, attendees: &[Attendee]) -> usize {
        let mut notified = 0usize;

        for attendee in attendees {
            match self.dispatch_one(notification, attendee).await {
                DispatchOutcome::Sent => notified += 1,
                DispatchOutcome::Rejected(code) => {
                    tracing::error!(
                        email = %attendee.email,
                        code,
                        "Mail transport rejected message"
                    );
                }
                DispatchOutcome::Failed(reason) => {
                    tracing::error!(
                        email = %attendee.email,
                        error = %reason,
                        "Mail transport call failed"
                    );
                }
            }
        }

        notified
    }

    async fn dispatch_one(&self, notification: &Notification, attendee: &Attendee) -> DispatchOutcome {
        let email = OutboundEmail {
            to: attendee.email.clone(),
            subject: personalized_subject(&attendee.first_name, &notification.subject),
            body_text: notification.message.clone(),
        };

        match self.transport.send(&email).await {
            Ok(code) if ACCEPTED_STATUS.contains(&code) => DispatchOutcome::Sent,
            Ok(code) => DispatchOutcome::Rejected(code),
            Err(e) => DispatchOutcome::Failed(e.to_string()),
        }
    }
}

/// Personalized subject line for one attendee.
pub fn personalized_subject(first_name: &str, subject: &str) -> String {
    format!("{}, {}", first_name, subject)
}

/// Final status text for a run that notified `notified` attendees.
fn status_text(notified: usize) -> String {
    format!("Notified {} attendees", notified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_mailer::{MockMailer, MockReply};

    fn make_notification(subject: &str, message: &str) -> Notification {
        Notification {
            id: 42,
            subject: subject.to_string(),
            message: message.to_string(),
            status: None,
            completed_date: None,
        }
    }

    fn make_attendee(email: &str, first_name: &str) -> Attendee {
        Attendee {
            email: email.to_string(),
            first_name: first_name.to_string(),
        }
    }

    #[test]
    fn test_status_text_shape() {
        assert_eq!(status_text(0), "Notified 0 attendees");
        assert_eq!(status_text(1), "Notified 1 attendees");
        assert_eq!(status_text(17), "Notified 17 attendees");
    }

    #[test]
    fn test_personalized_subject() {
        assert_eq!(
            personalized_subject("Ana", "Event Update"),
            "Ana, Event Update"
        );
    }

    #[tokio::test]
    async fn test_tally_counts_only_accepted_sends() {
        let mailer = MockMailer::new([
            MockReply::Status(202),
            MockReply::Status(500),
            MockReply::Error("connection reset".to_string()),
        ]);
        let engine = DispatchEngine::new(&mailer);

        let notification = make_notification("Event Update", "See you there");
        let attendees = vec![
            make_attendee("a@x.com", "Ana"),
            make_attendee("b@x.com", "Bo"),
            make_attendee("c@x.com", "Cy"),
        ];

        let notified = engine.dispatch_all(&notification, &attendees).await;

        assert_eq!(notified, 1);
        // Every attendee was attempted despite the failures in between
        assert_eq!(mailer.sent_count().await, 3);
    }

    #[tokio::test]
    async fn test_subject_personalized_body_verbatim() {
        let mailer = MockMailer::new([MockReply::Status(202), MockReply::Status(500)]);
        let engine = DispatchEngine::new(&mailer);

        let notification = make_notification("Event Update", "See you there");
        let attendees = vec![make_attendee("a@x.com", "Ana"), make_attendee("b@x.com", "Bo")];

        let notified = engine.dispatch_all(&notification, &attendees).await;
        assert_eq!(notified, 1);

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[0].subject, "Ana, Event Update");
        assert_eq!(sent[0].body_text, "See you there");
        assert_eq!(sent[1].to, "b@x.com");
        assert_eq!(sent[1].subject, "Bo, Event Update");
        assert_eq!(sent[1].body_text, "See you there");
    }

    #[tokio::test]
    async fn test_only_200_and_202_are_accepted() {
        let mailer = MockMailer::new([
            MockReply::Status(200),
            MockReply::Status(202),
            MockReply::Status(201),
            MockReply::Status(204),
            MockReply::Status(429),
        ]);
        let engine = DispatchEngine::new(&mailer);

        let notification = make_notification("Event Update", "See you there");
        let attendees: Vec<Attendee> = (0..5)
            .map(|i| make_attendee(&format!("user{}@x.com", i), "User"))
            .collect();

        let notified = engine.dispatch_all(&notification, &attendees).await;
        assert_eq!(notified, 2);
    }

    #[tokio::test]
    async fn test_empty_roster_sends_nothing() {
        let mailer = MockMailer::accepting();
        let engine = DispatchEngine::new(&mailer);

        let notification = make_notification("Event Update", "See you there");
        let notified = engine.dispatch_all(&notification, &[]).await;

        assert_eq!(notified, 0);
        assert_eq!(mailer.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_early_failure_does_not_block_later_attendees() {
        let mailer = MockMailer::new([MockReply::Error("timed out".to_string())]);
        let engine = DispatchEngine::new(&mailer);

        let notification = make_notification("Event Update", "See you there");
        let attendees = vec![
            make_attendee("a@x.com", "Ana"),
            make_attendee("b@x.com", "Bo"),
            make_attendee("c@x.com", "Cy"),
        ];

        let notified = engine.dispatch_all(&notification, &attendees).await;

        assert_eq!(notified, 2);
        assert_eq!(mailer.sent_count().await, 3);
    }
}

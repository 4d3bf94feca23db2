//! Scripted mail transport for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{MailError, MailTransport, OutboundEmail};

/// Scripted reply for one `send` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// The call completes with this upstream status code.
    Status(u16),
    /// The call fails at the transport level.
    Error(String),
}

/// Mock transport that captures sent emails and replays a script.
///
/// Calls beyond the end of the script are accepted with status 202.
pub struct MockMailer {
    replies: Mutex<VecDeque<MockReply>>,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl MockMailer {
    /// Create a mock that replays `replies` in order.
    pub fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that accepts every send with status 202.
    pub fn accepting() -> Self {
        Self::new([])
    }

    /// All emails handed to the transport, in call order.
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    /// Number of emails handed to the transport.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl MailTransport for MockMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<u16, MailError> {
        self.sent.lock().await.push(email.clone());

        match self.replies.lock().await.pop_front() {
            Some(MockReply::Status(code)) => Ok(code),
            Some(MockReply::Error(reason)) => Err(MailError::Transport(reason)),
            None => Ok(202),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_script_then_accepts() {
        let mailer = MockMailer::new([
            MockReply::Status(500),
            MockReply::Error("connection refused".to_string()),
        ]);

        let email = OutboundEmail {
            to: "test@example.com".to_string(),
            subject: "Test".to_string(),
            body_text: "Body".to_string(),
        };

        assert_eq!(mailer.send(&email).await.unwrap(), 500);
        assert!(mailer.send(&email).await.is_err());
        assert_eq!(mailer.send(&email).await.unwrap(), 202);
        assert_eq!(mailer.sent_count().await, 3);
    }

    #[tokio::test]
    async fn test_mock_captures_sent_emails() {
        let mailer = MockMailer::accepting();

        let email = OutboundEmail {
            to: "user@example.com".to_string(),
            subject: "Hello".to_string(),
            body_text: "World".to_string(),
        };
        mailer.send(&email).await.unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user@example.com");
    }
}

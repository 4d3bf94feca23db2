//! Outbound mail transport.
//!
//! Everything that leaves the process as email goes through the
//! [`MailTransport`] seam: the production implementation talks to the
//! SendGrid HTTP API, tests script a [`mock::MockMailer`]. Transports hand
//! back the upstream status code as-is; deciding which codes count as
//! delivered is the caller's contract, not the transport's.

pub mod mock;
pub mod sendgrid;

pub use mock::{MockMailer, MockReply};
pub use sendgrid::SendGridMailer;

use async_trait::async_trait;
use thiserror::Error;

/// A single outbound message, ready for the transport.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

/// Transport-level failure: the call itself did not complete.
///
/// A completed call with an unhappy status code is NOT an error here — the
/// code is returned for the caller to classify.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Trait for outbound mail transports.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Attempt delivery of one message, returning the upstream status code.
    async fn send(&self, email: &OutboundEmail) -> Result<u16, MailError>;
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for &T {
    async fn send(&self, email: &OutboundEmail) -> Result<u16, MailError> {
        (**self).send(email).await
    }
}

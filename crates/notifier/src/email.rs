//! Email sender trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::NotifierError;

/// A sent email, as recorded by the in-memory sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Trait for outbound email delivery.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one email. Failures are retryable by the caller.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}

#[derive(Debug, Default)]
struct SenderState {
    sent: Vec<SentEmail>,
    fail_on_send: bool,
}

/// In-memory email sender for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    state: Arc<RwLock<SenderState>>,
}

impl RecordingEmailSender {
    /// Creates a new recording sender.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sender to fail every send call.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the number of emails sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns a snapshot of all sent emails.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.state.read().unwrap().sent.clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(NotifierError::Email("mail relay rejected".to_string()));
        }

        state.sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sent_mail() {
        let sender = RecordingEmailSender::new();
        sender
            .send("a@b.com", "Order Received", "hello")
            .await
            .unwrap();

        assert_eq!(sender.sent_count(), 1);
        let sent = sender.sent();
        assert_eq!(sent[0].to, "a@b.com");
        assert_eq!(sent[0].subject, "Order Received");
    }

    #[tokio::test]
    async fn fail_on_send() {
        let sender = RecordingEmailSender::new();
        sender.set_fail_on_send(true);

        let result = sender.send("a@b.com", "Order Received", "hello").await;
        assert!(matches!(result, Err(NotifierError::Email(_))));
        assert_eq!(sender.sent_count(), 0);
    }
}

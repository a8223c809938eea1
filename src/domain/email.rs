use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Delivers a message through a concrete provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Hands a message off for background delivery without waiting on it
pub trait EmailQueue: Send + Sync {
    fn enqueue(&self, message: EmailMessage) -> Result<()>;
}

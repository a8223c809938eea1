use crate::domain::email::{EmailMessage, EmailQueue, EmailSender};
use crate::infrastructure::config::{EmailConfig, EmailProviderKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const DEFAULT_QUEUE_CAPACITY: usize = 256;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Writes messages to the log instead of delivering them
#[derive(Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery disabled, message logged only"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to a transactional email API
#[derive(Clone)]
pub struct HttpEmailSender {
    http_client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpEmailSender {
    pub fn new(
        http_client: reqwest::Client,
        api_url: String,
        api_key: Option<String>,
        from: String,
    ) -> Self {
        Self {
            http_client,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let request = SendEmailRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html_body,
        };

        let mut builder = self.http_client.post(&self.api_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        builder
            .send()
            .await
            .context("Failed to reach email service")?
            .error_for_status()
            .context("Email service returned an error")?;

        tracing::info!(to = %message.to, "Email sent");
        Ok(())
    }
}

/// Delivery backend, chosen once at startup
#[derive(Clone)]
pub enum EmailProvider {
    Log(LogEmailSender),
    Http(HttpEmailSender),
}

impl EmailProvider {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        match config.provider {
            EmailProviderKind::Log => Ok(EmailProvider::Log(LogEmailSender)),
            EmailProviderKind::Http => {
                let api_url = config
                    .api_url
                    .clone()
                    .context("EMAIL_API_URL must be set when EMAIL_PROVIDER=http")?;
                let http_client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()
                    .context("Failed to build email HTTP client")?;
                Ok(EmailProvider::Http(HttpEmailSender::new(
                    http_client,
                    api_url,
                    config.api_key.clone(),
                    config.from.clone(),
                )))
            }
        }
    }
}

#[async_trait]
impl EmailSender for EmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        match self {
            EmailProvider::Log(sender) => sender.send(message).await,
            EmailProvider::Http(sender) => sender.send(message).await,
        }
    }
}

/// Background delivery queue. Requests enqueue and move on; a worker task
/// owns delivery and retries.
#[derive(Clone)]
pub struct EmailDispatcher {
    queue: mpsc::Sender<EmailMessage>,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), doubling each time
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl EmailDispatcher {
    /// Spawn the worker on the current tokio runtime
    pub fn start(sender: Arc<dyn EmailSender>) -> (Self, JoinHandle<()>) {
        Self::with_policy(sender, DEFAULT_QUEUE_CAPACITY, RetryPolicy::default())
    }

    pub fn with_policy(
        sender: Arc<dyn EmailSender>,
        capacity: usize,
        policy: RetryPolicy,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<EmailMessage>(capacity);

        let worker = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                deliver(sender.as_ref(), &message, policy).await;
            }
            tracing::debug!("Email queue closed, worker exiting");
        });

        (Self { queue: tx }, worker)
    }
}

async fn deliver(sender: &dyn EmailSender, message: &EmailMessage, policy: RetryPolicy) {
    for attempt in 1..=policy.max_attempts {
        match sender.send(message).await {
            Ok(()) => return,
            Err(e) if attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    to = %message.to,
                    attempt,
                    ?delay,
                    "Email delivery failed, retrying: {:#}",
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::error!(
                    to = %message.to,
                    attempts = policy.max_attempts,
                    "Email delivery failed, dropping message: {:#}",
                    e
                );
            }
        }
    }
}

impl EmailQueue for EmailDispatcher {
    fn enqueue(&self, message: EmailMessage) -> Result<()> {
        self.queue
            .try_send(message)
            .map_err(|e| anyhow::anyhow!("Email queue rejected message: {}", e))
    }
}

use crate::application::tokens::generate_secure_token;
use crate::domain::email::{EmailMessage, EmailQueue};
use crate::domain::users::User;
use crate::domain::verification::{
    EmailVerificationToken, EmailVerificationTokenRepository, NewEmailVerificationToken,
    VERIFICATION_TOKEN_TTL_HOURS, VerificationTokenIssuer,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Creates verification tokens and queues the email with the link
pub struct EmailVerificationIssuer {
    token_repo: Arc<dyn EmailVerificationTokenRepository>,
    email_queue: Arc<dyn EmailQueue>,
    frontend_url: String,
}

impl EmailVerificationIssuer {
    pub fn new(
        token_repo: Arc<dyn EmailVerificationTokenRepository>,
        email_queue: Arc<dyn EmailQueue>,
        frontend_url: String,
    ) -> Self {
        Self {
            token_repo,
            email_queue,
            frontend_url,
        }
    }

    fn message(&self, to: &str, token: &str) -> EmailMessage {
        let url = format!(
            "{}/v1/email-verification/verify?token={}",
            self.frontend_url, token
        );
        let html_body = format!(
            r#"<html>
<body>
    <h1>Email verification</h1>
    <p>Click the link below to verify your email address:</p>
    <a href="{url}">Verify email</a>
    <p>Or paste this link into your browser:</p>
    <p>{url}</p>
    <p>This link expires in {VERIFICATION_TOKEN_TTL_HOURS} hours.</p>
</body>
</html>"#
        );

        EmailMessage {
            to: to.to_string(),
            subject: "Email verification".to_string(),
            html_body,
        }
    }
}

#[async_trait]
impl VerificationTokenIssuer for EmailVerificationIssuer {
    #[tracing::instrument(skip_all, fields(user_id = user.id))]
    async fn create_and_send(&self, user: &User) -> Result<EmailVerificationToken> {
        if let Err(e) = self.token_repo.invalidate_for_user(user.id).await {
            tracing::warn!("Failed to invalidate earlier verification tokens: {:#}", e);
        }

        let token = self
            .token_repo
            .create(NewEmailVerificationToken {
                user_id: user.id,
                email: user.email.clone(),
                token: generate_secure_token(),
                expires_at: OffsetDateTime::now_utc()
                    + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
            })
            .await?;

        // Delivery happens on the dispatcher; a full queue only loses the email
        if let Err(e) = self
            .email_queue
            .enqueue(self.message(&user.email, &token.token))
        {
            tracing::error!("Failed to queue verification email: {:#}", e);
        }

        tracing::info!("Verification token created and email queued");
        Ok(token)
    }
}

use crate::application::tokens::generate_secure_token;
use crate::domain::email::{EmailMessage, EmailQueue};
use crate::domain::recovery::{
    NewPasswordResetToken, PasswordResetTokenRepository, RESET_TOKEN_TTL_HOURS,
};
use crate::domain::users::{User, UserRepository, UserSource};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use validator::Validate;

/// Reported whether or not the address belongs to an account
pub const RECOVERY_REQUESTED_MESSAGE: &str =
    "If the email is registered, a recovery link will be sent.";

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct PasswordRecoveryRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

pub struct RequestPasswordRecoveryUseCase {
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn PasswordResetTokenRepository>,
    email_queue: Arc<dyn EmailQueue>,
    frontend_url: String,
}

impl RequestPasswordRecoveryUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_repo: Arc<dyn PasswordResetTokenRepository>,
        email_queue: Arc<dyn EmailQueue>,
        frontend_url: String,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            email_queue,
            frontend_url,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, email: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(AppError::InternalServerError)?;

        match user {
            Some(user) if user.source == UserSource::Local => self.issue(&user).await,
            Some(_) => {
                tracing::debug!("Recovery requested for a federated account, ignoring");
                Ok(())
            }
            None => {
                tracing::debug!("Recovery requested for unknown email");
                Ok(())
            }
        }
    }

    async fn issue(&self, user: &User) -> Result<(), AppError> {
        if let Err(e) = self.token_repo.invalidate_for_user(user.id).await {
            tracing::warn!("Failed to invalidate earlier reset tokens: {:#}", e);
        }

        let token = self
            .token_repo
            .create(NewPasswordResetToken {
                user_id: user.id,
                email: user.email.clone(),
                token: generate_secure_token(),
                expires_at: OffsetDateTime::now_utc() + Duration::hours(RESET_TOKEN_TTL_HOURS),
            })
            .await
            .map_err(AppError::InternalServerError)?;

        if let Err(e) = self.email_queue.enqueue(self.message(user, &token.token)) {
            tracing::error!(user_id = user.id, "Failed to queue recovery email: {:#}", e);
        }

        tracing::info!(user_id = user.id, "Password recovery token created");
        Ok(())
    }

    fn message(&self, user: &User, token: &str) -> EmailMessage {
        let link = format!("{}/reset-password?token={}", self.frontend_url, token);
        let html_body = format!(
            r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Hello, {name}</h2>
    <p>We received a request to reset your password.</p>
    <p>Click the link below to continue:</p>
    <div style="margin: 30px 0;">
        <a href="{link}" style="background-color: #007bff; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; font-weight: bold;">Reset password</a>
    </div>
    <p>If you did not ask for this, you can ignore this email.</p>
    <p style="font-size: 12px; color: #666;">Or paste this link into your browser:<br>{link}</p>
</div>"#,
            name = user.name,
        );

        EmailMessage {
            to: user.email.clone(),
            subject: "Password recovery".to_string(),
            html_body,
        }
    }
}

use crate::domain::users::UserRepository;
use crate::domain::verification::EmailVerificationTokenRepository;
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
pub struct VerifyEmailQuery {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VerifyEmailResponse {
    pub user_id: i64,
    pub email: String,
    pub message: String,
}

/// Window in which clicking an already-used link still reports success
const REPEAT_CLICK_WINDOW: Duration = Duration::hours(1);

pub struct VerifyEmailUseCase {
    token_repo: Arc<dyn EmailVerificationTokenRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl VerifyEmailUseCase {
    pub fn new(
        token_repo: Arc<dyn EmailVerificationTokenRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            token_repo,
            user_repo,
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, token: &str) -> Result<VerifyEmailResponse, AppError> {
        let stored = self
            .token_repo
            .find_by_token(token)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("Invalid or unknown token".to_string()))?;

        if stored.used {
            let stale = stored
                .verified_at
                .is_some_and(|at| at < OffsetDateTime::now_utc() - REPEAT_CLICK_WINDOW);
            if stale {
                return Err(AppError::ValidationError(
                    "Token expired. Request a new one".to_string(),
                ));
            }

            let user = self
                .user_repo
                .find_by_id(stored.user_id)
                .await
                .map_err(AppError::InternalServerError)?;
            if user.is_some_and(|u| u.metadata.email_verified) {
                return Ok(VerifyEmailResponse {
                    user_id: stored.user_id,
                    email: stored.email,
                    message: "Email was already verified".to_string(),
                });
            }

            return Err(AppError::ValidationError(
                "Token was already used".to_string(),
            ));
        }

        if stored.is_expired() {
            return Err(AppError::ValidationError(
                "Token expired. Request a new one".to_string(),
            ));
        }

        if !self
            .token_repo
            .mark_used(stored.id)
            .await
            .map_err(AppError::InternalServerError)?
        {
            return Err(AppError::ValidationError(
                "Token was already used".to_string(),
            ));
        }

        let mut user = self
            .user_repo
            .find_by_id(stored.user_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        user.active = true;
        user.metadata.email_verified = true;
        self.user_repo
            .update(&user)
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::info!(user_id = user.id, "Email verified");

        Ok(VerifyEmailResponse {
            user_id: user.id,
            email: user.email,
            message: "Email verified successfully".to_string(),
        })
    }
}

use crate::domain::auth::RefreshTokenRepository;
use crate::domain::password::{PasswordHashingService, check_password_policy};
use crate::domain::recovery::{PasswordResetToken, PasswordResetTokenRepository};
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
pub struct ResetTokenQuery {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ResetTokenStatus {
    pub valid: bool,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Checks a reset token without consuming it
pub struct VerifyResetTokenUseCase {
    token_repo: Arc<dyn PasswordResetTokenRepository>,
}

impl VerifyResetTokenUseCase {
    pub fn new(token_repo: Arc<dyn PasswordResetTokenRepository>) -> Self {
        Self { token_repo }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, token: &str) -> Result<PasswordResetToken, AppError> {
        let stored = self
            .token_repo
            .find_unused(token)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("Invalid or already used token".to_string()))?;

        if stored.is_expired() {
            return Err(AppError::ValidationError("Token expired".to_string()));
        }

        Ok(stored)
    }
}

pub struct ResetPasswordUseCase {
    token_repo: Arc<dyn PasswordResetTokenRepository>,
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl ResetPasswordUseCase {
    pub fn new(
        token_repo: Arc<dyn PasswordResetTokenRepository>,
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            token_repo,
            user_repo,
            refresh_token_repo,
            password_service,
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, req: ResetPasswordRequest) -> Result<(), AppError> {
        let token = VerifyResetTokenUseCase::new(self.token_repo.clone())
            .execute(&req.token)
            .await?;

        check_password_policy(&req.password)
            .map_err(|violation| AppError::ValidationError(violation.message()))?;

        let mut user = self
            .user_repo
            .find_by_id(token.user_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        // Claim the token before touching the password so it works only once
        let claimed = self
            .token_repo
            .mark_used(token.id)
            .await
            .map_err(AppError::InternalServerError)?;
        if !claimed {
            return Err(AppError::NotFound(
                "Invalid or already used token".to_string(),
            ));
        }

        user.password_hash = Some(
            self.password_service
                .hash_password(&req.password)
                .map_err(AppError::InternalServerError)?,
        );
        self.user_repo
            .update(&user)
            .await
            .map_err(AppError::InternalServerError)?;

        let revoked = self
            .refresh_token_repo
            .revoke_all_for_user(user.id)
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::info!(user_id = user.id, revoked, "Password reset");
        Ok(())
    }
}

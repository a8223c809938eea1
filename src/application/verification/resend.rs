use crate::domain::users::UserRepository;
use crate::domain::verification::VerificationTokenIssuer;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ResendVerificationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

pub struct ResendVerificationUseCase {
    user_repo: Arc<dyn UserRepository>,
    issuer: Arc<dyn VerificationTokenIssuer>,
}

impl ResendVerificationUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        issuer: Arc<dyn VerificationTokenIssuer>,
    ) -> Self {
        Self { user_repo, issuer }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, email: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.metadata.email_verified {
            return Err(AppError::ValidationError(
                "Email already verified".to_string(),
            ));
        }

        self.issuer
            .create_and_send(&user)
            .await
            .map_err(AppError::InternalServerError)?;

        Ok(())
    }
}

use crate::domain::password::{PasswordHashingService, check_password_policy};
use crate::domain::users::{
    DuplicateEmail, NewUser, User, UserMetadata, UserRepository, UserSource,
};
use crate::domain::verification::VerificationTokenIssuer;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the password policy by the use case
    pub password: String,
}

pub struct RegisterUseCase {
    user_repo: Arc<dyn UserRepository>,
    password_service: Arc<dyn PasswordHashingService>,
    verification_issuer: Arc<dyn VerificationTokenIssuer>,
}

impl RegisterUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordHashingService>,
        verification_issuer: Arc<dyn VerificationTokenIssuer>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            verification_issuer,
        }
    }

    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn execute(&self, req: SignupRequest) -> Result<User, AppError> {
        let existing = self
            .user_repo
            .find_by_email(&req.email)
            .await
            .map_err(AppError::InternalServerError)?;
        if existing.is_some() {
            return Err(AppError::Conflict("user already exists".to_string()));
        }

        if req.password.is_empty() {
            return Err(AppError::ValidationError(
                "password is required".to_string(),
            ));
        }
        check_password_policy(&req.password)
            .map_err(|violation| AppError::ValidationError(violation.message()))?;

        let password_hash = self
            .password_service
            .hash_password(&req.password)
            .map_err(AppError::InternalServerError)?;

        // Accounts stay inactive until the email address is confirmed
        let new_user = NewUser {
            name: req.name,
            email: req.email,
            password_hash: Some(password_hash),
            img_url: None,
            admin: false,
            active: false,
            source: UserSource::Local,
            metadata: UserMetadata::default(),
        };

        // A concurrent signup can still win the insert after the lookup above
        let user = self.user_repo.create(new_user).await.map_err(|e| {
            if e.is::<DuplicateEmail>() {
                AppError::Conflict("user already exists".to_string())
            } else {
                AppError::InternalServerError(e)
            }
        })?;

        if let Err(e) = self.verification_issuer.create_and_send(&user).await {
            tracing::error!(
                user_id = user.id,
                "Failed to issue email verification token: {:#}",
                e
            );
        }

        tracing::info!(user_id = user.id, "User registered");

        Ok(user)
    }
}

use crate::domain::password::PasswordHashingService;
use crate::domain::users::{NewUser, User, UserMetadata, UserRepository, UserSource};
use crate::shared::error::AppError;
use std::sync::Arc;

/// Ensures the configured administrator account exists
pub struct SeedAdminUseCase {
    repo: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHashingService>,
}

impl SeedAdminUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            repo,
            password_hasher,
        }
    }

    /// Returns the created admin, or None when the email is already taken
    #[tracing::instrument(skip(self, password))]
    pub async fn execute(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        if self.repo.find_by_email(email).await?.is_some() {
            tracing::debug!("Admin account already present");
            return Ok(None);
        }

        let password_hash = self
            .password_hasher
            .hash_password(password)
            .map_err(AppError::InternalServerError)?;

        let admin = self
            .repo
            .create(NewUser {
                name: "Administrator".to_string(),
                email: email.to_string(),
                password_hash: Some(password_hash),
                img_url: None,
                admin: true,
                active: true,
                source: UserSource::Local,
                metadata: UserMetadata {
                    email_verified: true,
                    ..UserMetadata::default()
                },
            })
            .await?;

        tracing::info!(user_id = admin.id, "Admin account created");
        Ok(Some(admin))
    }
}

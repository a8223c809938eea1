use crate::application::auth::session::{IssuedSession, SessionIssuer, ensure_account_usable};
use crate::domain::auth::ClientContext;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{User, UserRepository};
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid email or password";

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub user_id: i64,
    pub email: String,
    pub access_token: String,
    pub expires_in: i64,
}

pub struct LoginOutcome {
    pub user: User,
    pub session: IssuedSession,
}

impl LoginOutcome {
    pub fn response(&self) -> LoginResponse {
        LoginResponse {
            user_id: self.user.id,
            email: self.user.email.clone(),
            access_token: self.session.tokens.access_token.clone(),
            expires_in: self.session.tokens.expires_in,
        }
    }
}

pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    password_service: Arc<dyn PasswordHashingService>,
    sessions: SessionIssuer,
}

impl LoginUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordHashingService>,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            sessions,
        }
    }

    /// Check credentials and account state without opening a session
    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn authenticate(&self, req: &LoginRequest) -> Result<User, AppError> {
        let invalid = || AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string());

        let user = self
            .user_repo
            .find_by_email(&req.email)
            .await
            .map_err(AppError::InternalServerError)?;

        // Unknown emails and federated accounts without a local password fail alike
        let Some((user, hash)) = user.and_then(|u| u.password_hash.clone().map(|h| (u, h))) else {
            self.burn_hash(&req.password);
            return Err(invalid());
        };

        let valid_password = self
            .password_service
            .verify_password(&req.password, &hash)
            .map_err(AppError::InternalServerError)?;

        if !valid_password {
            return Err(invalid());
        }

        ensure_account_usable(&user)?;

        Ok(user)
    }

    /// Spends one hash so an unknown email takes as long as a wrong password
    fn burn_hash(&self, password: &str) {
        if let Err(e) = self.password_service.hash_password(password) {
            tracing::warn!("Failed to compute decoy hash: {:#}", e);
        }
    }

    pub async fn execute(
        &self,
        req: LoginRequest,
        client: ClientContext,
    ) -> Result<LoginOutcome, AppError> {
        let user = self.authenticate(&req).await?;
        let session = self.sessions.create_session(&user, &client).await?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(LoginOutcome { user, session })
    }
}

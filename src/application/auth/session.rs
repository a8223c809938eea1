use crate::application::tokens::hash_token;
use crate::domain::auth::{
    ClientContext, NewRefreshToken, RefreshToken, RefreshTokenRepository, TokenCodec,
};
use crate::domain::users::User;
use crate::infrastructure::cookies::SessionCookies;
use crate::shared::error::AppError;
use cookie::Cookie;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const INACTIVE_ACCOUNT_MESSAGE: &str = "Your account is inactive. Contact support.";
pub const UNVERIFIED_EMAIL_MESSAGE: &str =
    "Email not verified. Check your inbox to access your account.";

/// Common response structure for token operations
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// A freshly issued token pair plus the cookies that carry it
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub tokens: TokenResponse,
    pub cookies: Vec<Cookie<'static>>,
    pub family_id: Uuid,
}

/// Admins bypass the account-state checks
pub fn ensure_account_usable(user: &User) -> Result<(), AppError> {
    if user.admin {
        return Ok(());
    }
    if !user.active {
        return Err(AppError::Unauthorized(INACTIVE_ACCOUNT_MESSAGE.to_string()));
    }
    if !user.metadata.email_verified {
        return Err(AppError::Unauthorized(UNVERIFIED_EMAIL_MESSAGE.to_string()));
    }
    Ok(())
}

/// Issues token pairs and records the refresh half
#[derive(Clone)]
pub struct SessionIssuer {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    token_codec: Arc<dyn TokenCodec>,
    cookies: SessionCookies,
}

impl SessionIssuer {
    pub fn new(
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        token_codec: Arc<dyn TokenCodec>,
        cookies: SessionCookies,
    ) -> Self {
        Self {
            refresh_token_repo,
            token_codec,
            cookies,
        }
    }

    pub fn token_codec(&self) -> &Arc<dyn TokenCodec> {
        &self.token_codec
    }

    /// Start a new refresh-token family
    #[tracing::instrument(skip(self, user, client), fields(user_id = user.id))]
    pub async fn create_session(
        &self,
        user: &User,
        client: &ClientContext,
    ) -> Result<IssuedSession, AppError> {
        self.issue(user, client, Uuid::new_v4(), None).await
    }

    /// Continue `previous`'s family with a token chained to it
    pub async fn rotate(
        &self,
        user: &User,
        client: &ClientContext,
        previous: &RefreshToken,
    ) -> Result<IssuedSession, AppError> {
        self.issue(user, client, previous.family_id, Some(previous.id))
            .await
    }

    async fn issue(
        &self,
        user: &User,
        client: &ClientContext,
        family_id: Uuid,
        rotated_from: Option<Uuid>,
    ) -> Result<IssuedSession, AppError> {
        let (access_token, _) = self
            .token_codec
            .issue_access_token(user)
            .map_err(AppError::InternalServerError)?;

        let (refresh_token, refresh_claims) = self
            .token_codec
            .issue_refresh_token(user)
            .map_err(AppError::InternalServerError)?;

        let new_refresh_token = NewRefreshToken {
            user_id: user.id,
            user_email: user.email.clone(),
            device_id: client.device_id.clone(),
            user_agent: client.user_agent.clone(),
            ip_address: client.ip_address.clone(),
            jti: refresh_claims.jti.clone(),
            family_id,
            token_hash: hash_token(&refresh_token),
            expires_at: refresh_claims
                .expires_at()
                .map_err(AppError::InternalServerError)?,
            rotated_from,
        };

        self.refresh_token_repo
            .create(new_refresh_token)
            .await
            .map_err(AppError::InternalServerError)?;

        let cookies = self
            .cookies
            .build_session_cookies(&access_token, &refresh_token);

        Ok(IssuedSession {
            tokens: TokenResponse {
                access_token,
                refresh_token,
                token_type: "Bearer".to_string(),
                expires_in: self.token_codec.access_token_ttl(),
            },
            cookies,
            family_id,
        })
    }
}

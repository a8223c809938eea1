use crate::application::auth::session::{IssuedSession, SessionIssuer, ensure_account_usable};
use crate::application::tokens::hash_token;
use crate::domain::auth::{ClientContext, RefreshToken, RefreshTokenRepository, TokenType};
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;
use std::sync::Arc;

pub const INVALID_REFRESH_TOKEN_MESSAGE: &str = "invalid refresh token";
pub const INVALID_TOKEN_TYPE_MESSAGE: &str = "invalid token type";
pub const TOKEN_NOT_FOUND_MESSAGE: &str = "refresh token not found or revoked";
pub const TOKEN_REVOKED_MESSAGE: &str = "token revoked";
pub const TOKEN_ALREADY_USED_MESSAGE: &str = "token already used";

/// Rotates a refresh token. Presenting a token that was already redeemed or
/// revoked revokes every refresh token the user holds.
pub struct RefreshTokenUseCase {
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    sessions: SessionIssuer,
}

impl RefreshTokenUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            user_repo,
            refresh_token_repo,
            sessions,
        }
    }

    #[tracing::instrument(skip_all, fields(device_id = %client.device_id))]
    pub async fn execute(
        &self,
        raw_token: &str,
        client: ClientContext,
    ) -> Result<IssuedSession, AppError> {
        let claims = self
            .sessions
            .token_codec()
            .validate_token(raw_token)
            .map_err(|_| AppError::Unauthorized(INVALID_REFRESH_TOKEN_MESSAGE.to_string()))?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Unauthorized(
                INVALID_TOKEN_TYPE_MESSAGE.to_string(),
            ));
        }

        let token_hash = hash_token(raw_token);
        let stored = self
            .refresh_token_repo
            .find_by_hash(&token_hash)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::Unauthorized(TOKEN_NOT_FOUND_MESSAGE.to_string()))?;

        if stored.is_revoked() {
            return Err(self.contain_reuse(&stored, TOKEN_REVOKED_MESSAGE).await);
        }
        if stored.used {
            return Err(self.contain_reuse(&stored, TOKEN_ALREADY_USED_MESSAGE).await);
        }

        let user = self
            .user_repo
            .find_by_id(stored.user_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::Unauthorized("user not found".to_string()))?;

        ensure_account_usable(&user)?;

        // Only one concurrent redemption can flip `used`; the loser is a replay
        let claimed = self
            .refresh_token_repo
            .mark_used(&token_hash)
            .await
            .map_err(AppError::InternalServerError)?;
        if !claimed {
            return Err(self.contain_reuse(&stored, TOKEN_ALREADY_USED_MESSAGE).await);
        }

        let session = self.sessions.rotate(&user, &client, &stored).await?;

        tracing::debug!(
            user_id = user.id,
            family_id = %stored.family_id,
            "Refresh token rotated"
        );

        Ok(session)
    }

    /// Revoke the user's whole refresh-token surface and build the error to report
    async fn contain_reuse(&self, stored: &RefreshToken, message: &str) -> AppError {
        tracing::warn!(
            user_id = stored.user_id,
            family_id = %stored.family_id,
            reason = message,
            "Refresh token reuse detected, revoking all sessions"
        );

        if let Err(e) = self
            .refresh_token_repo
            .revoke_all_for_user(stored.user_id)
            .await
        {
            return AppError::InternalServerError(e);
        }

        AppError::Unauthorized(message.to_string())
    }
}

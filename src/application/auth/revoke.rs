use crate::application::tokens::hash_token;
use crate::domain::auth::RefreshTokenRepository;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Single-device logout
pub struct RevokeRefreshTokenUseCase {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
}

impl RevokeRefreshTokenUseCase {
    pub fn new(refresh_token_repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { refresh_token_repo }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, raw_token: &str) -> Result<(), AppError> {
        if raw_token.is_empty() {
            return Ok(());
        }

        let revoked = self
            .refresh_token_repo
            .revoke_by_hash(&hash_token(raw_token))
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::debug!(revoked, "Refresh token revoked");
        Ok(())
    }
}

/// Logout from every device, optionally sparing the current session
pub struct RevokeAllRefreshTokensUseCase {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
}

impl RevokeAllRefreshTokensUseCase {
    pub fn new(refresh_token_repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { refresh_token_repo }
    }

    #[tracing::instrument(skip(self, except_raw_token))]
    pub async fn execute(
        &self,
        user_id: i64,
        except_raw_token: Option<&str>,
    ) -> Result<u64, AppError> {
        let revoked = match except_raw_token.filter(|t| !t.is_empty()) {
            Some(raw) => {
                self.refresh_token_repo
                    .revoke_all_for_user_except(user_id, &hash_token(raw))
                    .await
            }
            None => self.refresh_token_repo.revoke_all_for_user(user_id).await,
        }
        .map_err(AppError::InternalServerError)?;

        tracing::info!(user_id, revoked, "Refresh tokens revoked");
        Ok(revoked)
    }
}

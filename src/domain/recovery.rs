use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;

/// Password reset tokens stay valid for this many hours
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub used: bool,
    pub used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl PasswordResetToken {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewPasswordResetToken {
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait PasswordResetTokenRepository: Send + Sync {
    async fn create(&self, token: NewPasswordResetToken) -> Result<PasswordResetToken>;

    /// Lookup restricted to tokens that are still unused
    async fn find_unused(&self, token: &str) -> Result<Option<PasswordResetToken>>;

    async fn invalidate_for_user(&self, user_id: i64) -> Result<u64>;

    /// Returns false when the token had already been used
    async fn mark_used(&self, id: i64) -> Result<bool>;
}

use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::users::User;

/// Email verification tokens stay valid for this many hours
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct EmailVerificationToken {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub verified_at: Option<OffsetDateTime>,
    pub used: bool,
    pub created_at: OffsetDateTime,
}

impl EmailVerificationToken {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewEmailVerificationToken {
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait EmailVerificationTokenRepository: Send + Sync {
    async fn create(&self, token: NewEmailVerificationToken) -> Result<EmailVerificationToken>;

    /// Lookup including tokens that were already used
    async fn find_by_token(&self, token: &str) -> Result<Option<EmailVerificationToken>>;

    /// Mark every unused token of the user as used
    async fn invalidate_for_user(&self, user_id: i64) -> Result<u64>;

    /// Returns false when the token had already been used
    async fn mark_used(&self, id: i64) -> Result<bool>;
}

/// Creates a verification token and queues the email carrying it
#[async_trait]
pub trait VerificationTokenIssuer: Send + Sync {
    async fn create_and_send(&self, user: &User) -> Result<EmailVerificationToken>;
}

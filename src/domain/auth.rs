use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::users::User;

/// Marker embedded in every token so one kind can never stand in for the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Numeric user id, as a string
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub plan: String,
    pub access_mode: String,
    /// Unique token id
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iss: String,
    pub aud: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    pub fn for_user(
        user: &User,
        token_type: TokenType,
        issuer: &str,
        audience: &str,
        ttl_seconds: i64,
    ) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: user.email.clone(),
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles(),
            plan: user.metadata.plan_type.as_str().to_string(),
            access_mode: user.metadata.access_mode.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    pub fn user_id(&self) -> Result<i64> {
        self.id
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("Invalid user ID in claims: {}", e))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn expires_at(&self) -> Result<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.exp)
            .map_err(|e| anyhow::anyhow!("Invalid expiration in claims: {}", e))
    }
}

/// One issued refresh token. The raw token is never stored, only its hash.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: i64,
    pub user_email: String,
    pub device_id: String,
    pub user_agent: String,
    pub ip_address: String,
    pub jti: String,
    /// Shared by every token rotated out of the same login
    pub family_id: Uuid,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub used: bool,
    pub used_at: Option<OffsetDateTime>,
    pub rotated_from: Option<Uuid>,
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Redeemable: neither used nor revoked
    pub fn is_live(&self) -> bool {
        !self.used && self.revoked_at.is_none()
    }
}

/// New refresh token for creation
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: i64,
    pub user_email: String,
    pub device_id: String,
    pub user_agent: String,
    pub ip_address: String,
    pub jti: String,
    pub family_id: Uuid,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub rotated_from: Option<Uuid>,
}

/// Repository trait for refresh tokens
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Create a new refresh token
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken>;

    /// Find a refresh token by its hash, whatever its state
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>>;

    /// Revoke a single token. Already revoked rows are left untouched.
    async fn revoke_by_hash(&self, token_hash: &str) -> Result<u64>;

    /// Revoke every live token of a user
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64>;

    /// Revoke every live token of a user except the one with `except_hash`
    async fn revoke_all_for_user_except(&self, user_id: i64, except_hash: &str) -> Result<u64>;

    /// Atomically flip `used` from false to true on a live token.
    /// Returns false when the row was already used, revoked or missing.
    async fn mark_used(&self, token_hash: &str) -> Result<bool>;
}

/// Signs and verifies session tokens
pub trait TokenCodec: Send + Sync {
    fn issue_access_token(&self, user: &User) -> Result<(String, Claims)>;

    fn issue_refresh_token(&self, user: &User) -> Result<(String, Claims)>;

    /// Verify signature, algorithm, issuer, audience and expiry
    fn validate_token(&self, token: &str) -> Result<Claims>;

    /// Access token lifetime in seconds
    fn access_token_ttl(&self) -> i64;

    /// Refresh token lifetime in seconds
    fn refresh_token_ttl(&self) -> i64;
}

/// Where a session request came from, recorded on every refresh token row
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub user_agent: String,
    pub ip_address: String,
    pub device_id: String,
}

impl ClientContext {
    pub fn new(
        user_agent: impl Into<String>,
        ip_address: impl Into<String>,
        device_id: Option<String>,
    ) -> Self {
        let user_agent = user_agent.into();
        let ip_address = ip_address.into();
        let device_id = device_id
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("{}_{}", user_agent, ip_address));
        Self {
            user_agent,
            ip_address,
            device_id,
        }
    }
}

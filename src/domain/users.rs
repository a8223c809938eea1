use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessMode {
    ReadWrite,
    ReadOnly,
    Disabled,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "READ_WRITE",
            AccessMode::ReadOnly => "READ_ONLY",
            AccessMode::Disabled => "DISABLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Free,
    Pro,
    Enterprise,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "FREE",
            PlanType::Pro => "PRO",
            PlanType::Enterprise => "ENTERPRISE",
        }
    }
}

/// Where the account was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserSource {
    Local,
    Google,
}

impl UserSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserSource::Local => "LOCAL",
            UserSource::Google => "GOOGLE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LOCAL" => Some(UserSource::Local),
            "GOOGLE" => Some(UserSource::Google),
            _ => None,
        }
    }
}

impl fmt::Display for UserSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account settings stored as a JSON document beside the user row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub access_mode: AccessMode,
    pub plan_type: PlanType,
    pub email_verified: bool,
    pub locale: String,
}

impl Default for UserMetadata {
    fn default() -> Self {
        Self {
            access_mode: AccessMode::ReadWrite,
            plan_type: PlanType::Free,
            email_verified: false,
            locale: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub img_url: Option<String>,
    pub admin: bool,
    pub active: bool,
    pub source: UserSource,
    pub metadata: UserMetadata,
    #[serde(with = "time::serde::iso8601::option")]
    pub last_access: Option<OffsetDateTime>,
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Role names embedded into issued tokens
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec!["USER".to_string()];
        if self.admin {
            roles.push("ADMIN".to_string());
        }
        roles
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub img_url: Option<String>,
    pub admin: bool,
    pub active: bool,
    pub source: UserSource,
    pub metadata: UserMetadata,
}

/// Returned by `UserRepository::create` when the email is already taken
#[derive(Debug, thiserror::Error)]
#[error("email {0} is already registered")]
pub struct DuplicateEmail(pub String);

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`DuplicateEmail`] when the email is already registered
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    /// Persists every mutable column of `user` and returns the stored row
    async fn update(&self, user: &User) -> Result<User, anyhow::Error>;
}

use crate::domain::auth::{NewRefreshToken, RefreshToken, RefreshTokenRepository};
use crate::domain::email::{EmailMessage, EmailQueue};
use crate::domain::recovery::{
    NewPasswordResetToken, PasswordResetToken, PasswordResetTokenRepository,
};
use crate::domain::users::{DuplicateEmail, NewUser, User, UserRepository};
use crate::domain::verification::{
    EmailVerificationToken, EmailVerificationTokenRepository, NewEmailVerificationToken,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DuplicateEmail(new_user.email).into());
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: users.len() as i64 + 1,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            img_url: new_user.img_url,
            admin: new_user.admin,
            active: new_user.active,
            source: new_user.source,
            metadata: new_user.metadata,
            last_access: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<User, anyhow::Error> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| anyhow::anyhow!("User {} not found", user.id))?;
        *stored = User {
            updated_at: OffsetDateTime::now_utc(),
            ..user.clone()
        };
        Ok(stored.clone())
    }
}

#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<Mutex<Vec<RefreshToken>>>,
}

impl MockRefreshTokenRepository {
    pub fn all(&self) -> Vec<RefreshToken> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn for_user(&self, user_id: i64) -> Vec<RefreshToken> {
        self.all()
            .into_iter()
            .filter(|t| t.user_id == user_id)
            .collect()
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> anyhow::Result<RefreshToken> {
        let stored = RefreshToken {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            user_email: token.user_email,
            device_id: token.device_id,
            user_agent: token.user_agent,
            ip_address: token.ip_address,
            jti: token.jti,
            family_id: token.family_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            created_at: OffsetDateTime::now_utc(),
            used: false,
            used_at: None,
            rotated_from: token.rotated_from,
            revoked_at: None,
        };
        self.tokens.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_by_hash(&self, token_hash: &str) -> anyhow::Result<Option<RefreshToken>> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> anyhow::Result<u64> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.lock().unwrap();
        let mut count = 0;
        for token in tokens
            .iter_mut()
            .filter(|t| t.token_hash == token_hash && t.revoked_at.is_none())
        {
            token.revoked_at = Some(now);
            count += 1;
        }
        Ok(count)
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> anyhow::Result<u64> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.lock().unwrap();
        let mut count = 0;
        for token in tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && t.revoked_at.is_none())
        {
            token.revoked_at = Some(now);
            count += 1;
        }
        Ok(count)
    }

    async fn revoke_all_for_user_except(
        &self,
        user_id: i64,
        except_hash: &str,
    ) -> anyhow::Result<u64> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.lock().unwrap();
        let mut count = 0;
        for token in tokens.iter_mut().filter(|t| {
            t.user_id == user_id && t.token_hash != except_hash && t.revoked_at.is_none()
        }) {
            token.revoked_at = Some(now);
            count += 1;
        }
        Ok(count)
    }

    async fn mark_used(&self, token_hash: &str) -> anyhow::Result<bool> {
        // The check and the flip happen under one lock
        let mut tokens = self.tokens.lock().unwrap();
        match tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && t.is_live())
        {
            Some(token) => {
                token.used = true;
                token.used_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockEmailVerificationTokenRepository {
    tokens: Arc<Mutex<Vec<EmailVerificationToken>>>,
}

impl MockEmailVerificationTokenRepository {
    pub fn all(&self) -> Vec<EmailVerificationToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailVerificationTokenRepository for MockEmailVerificationTokenRepository {
    async fn create(
        &self,
        token: NewEmailVerificationToken,
    ) -> anyhow::Result<EmailVerificationToken> {
        let mut tokens = self.tokens.lock().unwrap();
        let stored = EmailVerificationToken {
            id: tokens.len() as i64 + 1,
            user_id: token.user_id,
            email: token.email,
            token: token.token,
            expires_at: token.expires_at,
            verified_at: None,
            used: false,
            created_at: OffsetDateTime::now_utc(),
        };
        tokens.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<EmailVerificationToken>> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn invalidate_for_user(&self, user_id: i64) -> anyhow::Result<u64> {
        let mut tokens = self.tokens.lock().unwrap();
        let mut count = 0;
        for token in tokens.iter_mut().filter(|t| t.user_id == user_id && !t.used) {
            token.used = true;
            count += 1;
        }
        Ok(count)
    }

    async fn mark_used(&self, id: i64) -> anyhow::Result<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id && !t.used) {
            Some(token) => {
                token.used = true;
                token.verified_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockPasswordResetTokenRepository {
    tokens: Arc<Mutex<Vec<PasswordResetToken>>>,
}

impl MockPasswordResetTokenRepository {
    pub fn all(&self) -> Vec<PasswordResetToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl PasswordResetTokenRepository for MockPasswordResetTokenRepository {
    async fn create(&self, token: NewPasswordResetToken) -> anyhow::Result<PasswordResetToken> {
        let mut tokens = self.tokens.lock().unwrap();
        let stored = PasswordResetToken {
            id: tokens.len() as i64 + 1,
            user_id: token.user_id,
            email: token.email,
            token: token.token,
            expires_at: token.expires_at,
            used: false,
            used_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        tokens.push(stored.clone());
        Ok(stored)
    }

    async fn find_unused(&self, token: &str) -> anyhow::Result<Option<PasswordResetToken>> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token == token && !t.used).cloned())
    }

    async fn invalidate_for_user(&self, user_id: i64) -> anyhow::Result<u64> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.lock().unwrap();
        let mut count = 0;
        for token in tokens.iter_mut().filter(|t| t.user_id == user_id && !t.used) {
            token.used = true;
            token.used_at = Some(now);
            count += 1;
        }
        Ok(count)
    }

    async fn mark_used(&self, id: i64) -> anyhow::Result<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id && !t.used) {
            Some(token) => {
                token.used = true;
                token.used_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Collects queued emails instead of delivering them
#[derive(Clone, Default)]
pub struct MockEmailQueue {
    messages: Arc<Mutex<Vec<EmailMessage>>>,
    reject: bool,
}

impl MockEmailQueue {
    /// A queue that refuses every message
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl EmailQueue for MockEmailQueue {
    fn enqueue(&self, message: EmailMessage) -> anyhow::Result<()> {
        if self.reject {
            anyhow::bail!("Email queue is full");
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

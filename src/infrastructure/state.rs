use crate::domain::auth::{RefreshTokenRepository, TokenCodec};
use crate::domain::email::EmailQueue;
use crate::domain::identity::IdentityVerifier;
use crate::domain::password::PasswordHashingService;
use crate::domain::recovery::PasswordResetTokenRepository;
use crate::domain::users::UserRepository;
use crate::domain::verification::EmailVerificationTokenRepository;
use crate::infrastructure::auth::JwtAuthService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::cookies::SessionCookies;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::identity::GoogleIdentityVerifier;
use crate::infrastructure::password::PasswordService;
use crate::infrastructure::repositories::email_verification_tokens::PostgresEmailVerificationTokenRepository;
use crate::infrastructure::repositories::password_reset_tokens::PostgresPasswordResetTokenRepository;
use crate::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Absent when the state is backed by in-memory repositories
    pub pool: Option<DbPool>,
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub verification_tokens: Arc<dyn EmailVerificationTokenRepository>,
    pub reset_tokens: Arc<dyn PasswordResetTokenRepository>,
    pub token_codec: Arc<dyn TokenCodec>,
    pub password_service: Arc<dyn PasswordHashingService>,
    pub email_queue: Arc<dyn EmailQueue>,
    /// None when no Google client ids are configured
    pub identity_verifier: Option<Arc<dyn IdentityVerifier>>,
    pub cookies: SessionCookies,
    pub frontend_url: String,
}

impl AppState {
    /// Wire Postgres repositories and the configured services
    pub fn new(
        pool: DbPool,
        config: &AppConfig,
        email_queue: Arc<dyn EmailQueue>,
    ) -> anyhow::Result<Self> {
        let identity_verifier: Option<Arc<dyn IdentityVerifier>> =
            if config.google_client_ids.is_empty() {
                tracing::info!("GOOGLE_CLIENT_IDS not set, federated login disabled");
                None
            } else {
                Some(Arc::new(GoogleIdentityVerifier::new(
                    config.google_client_ids.clone(),
                )?))
            };

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            refresh_tokens: Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
            verification_tokens: Arc::new(PostgresEmailVerificationTokenRepository::new(
                pool.clone(),
            )),
            reset_tokens: Arc::new(PostgresPasswordResetTokenRepository::new(pool.clone())),
            pool: Some(pool),
            token_codec: Arc::new(JwtAuthService::new(&config.jwt)),
            password_service: Arc::new(PasswordService::new()),
            email_queue,
            identity_verifier,
            cookies: SessionCookies::new(config.cookies.clone()),
            frontend_url: config.email.frontend_url.clone(),
        })
    }
}

use crate::application::auth::refresh::RefreshTokenUseCase;
use crate::application::auth::session::{SessionIssuer, ensure_account_usable};
use crate::domain::auth::ClientContext;
use crate::domain::identity::{ExternalIdentity, IdentityVerifier};
use crate::domain::users::{DuplicateEmail, NewUser, User, UserMetadata, UserRepository};
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct MobileOAuth2Request {
    #[validate(length(min = 1, message = "idToken is required"))]
    #[serde(rename = "idToken")]
    pub id_token: String,

    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MobileAuthResult {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub is_new_user: bool,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct MobileRefreshRequest {
    #[validate(length(min = 1, message = "refreshToken is required"))]
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MobileRefreshResult {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Login with an identity token issued by a third-party provider
pub struct FederatedLoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    verifier: Arc<dyn IdentityVerifier>,
    sessions: SessionIssuer,
}

impl FederatedLoginUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        verifier: Arc<dyn IdentityVerifier>,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            user_repo,
            verifier,
            sessions,
        }
    }

    #[tracing::instrument(skip_all, fields(provider = ?self.verifier.provider()))]
    pub async fn execute(
        &self,
        id_token: &str,
        client: ClientContext,
    ) -> Result<MobileAuthResult, AppError> {
        let identity = self.verifier.verify(id_token).await.map_err(|e| {
            tracing::debug!("Identity token rejected: {:#}", e);
            AppError::Unauthorized("failed to verify identity token".to_string())
        })?;

        let (mut user, is_new_user) = self.find_or_create(&identity).await?;
        ensure_account_usable(&user)?;

        user.last_access = Some(OffsetDateTime::now_utc());
        let user = self
            .user_repo
            .update(&user)
            .await
            .map_err(AppError::InternalServerError)?;

        let session = self.sessions.create_session(&user, &client).await?;

        tracing::info!(user_id = user.id, is_new_user, "Federated login");

        Ok(MobileAuthResult {
            user_id: user.id,
            email: user.email,
            name: user.name,
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            expires_in: session.tokens.expires_in,
            is_new_user,
        })
    }

    async fn find_or_create(&self, identity: &ExternalIdentity) -> Result<(User, bool), AppError> {
        let source = self.verifier.provider().user_source();

        let existing = self
            .user_repo
            .find_by_email(&identity.email)
            .await
            .map_err(AppError::InternalServerError)?;

        if let Some(mut user) = existing {
            if user.source != source {
                user.source = source;
                if let Some(picture) = &identity.picture_url {
                    user.img_url = Some(picture.clone());
                }
                // The provider vouches for the address, same as clicking the link
                if !user.metadata.email_verified {
                    user.metadata.email_verified = true;
                    user.active = true;
                }
                user = self
                    .user_repo
                    .update(&user)
                    .await
                    .map_err(AppError::InternalServerError)?;
            }
            return Ok((user, false));
        }

        let new_user = NewUser {
            name: identity.name.clone(),
            email: identity.email.clone(),
            password_hash: None,
            img_url: identity.picture_url.clone(),
            admin: false,
            active: true,
            source,
            metadata: UserMetadata {
                email_verified: true,
                ..UserMetadata::default()
            },
        };

        match self.user_repo.create(new_user).await {
            Ok(user) => Ok((user, true)),
            // Another first login for the same address inserted the row first
            Err(e) if e.is::<DuplicateEmail>() => self
                .user_repo
                .find_by_email(&identity.email)
                .await
                .map_err(AppError::InternalServerError)?
                .map(|user| (user, false))
                .ok_or_else(|| AppError::Conflict("user already exists".to_string())),
            Err(e) => Err(AppError::InternalServerError(e)),
        }
    }
}

/// Refresh rotation for clients that keep tokens outside cookies
pub struct RefreshMobileTokenUseCase {
    refresh: RefreshTokenUseCase,
}

impl RefreshMobileTokenUseCase {
    pub fn new(refresh: RefreshTokenUseCase) -> Self {
        Self { refresh }
    }

    pub async fn execute(
        &self,
        raw_token: &str,
        client: ClientContext,
    ) -> Result<MobileRefreshResult, AppError> {
        let session = self.refresh.execute(raw_token, client).await?;

        Ok(MobileRefreshResult {
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            expires_in: session.tokens.expires_in,
        })
    }
}

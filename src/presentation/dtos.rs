use crate::application::auth::login::LoginResponse;
use crate::application::auth::session::TokenResponse;
use crate::domain::auth::Claims;
use crate::domain::users::{User, UserMetadata};
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Session attributes returned by cookie-based login and refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthTokenResource {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<LoginResponse> for AuthTokenResource {
    fn from(response: LoginResponse) -> Self {
        Self {
            user_id: Some(response.user_id),
            email: Some(response.email),
            access_token: response.access_token,
            token_type: "Bearer".to_string(),
            expires_in: response.expires_in,
        }
    }
}

impl From<TokenResponse> for AuthTokenResource {
    fn from(tokens: TokenResponse) -> Self {
        Self {
            user_id: None,
            email: None,
            access_token: tokens.access_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserMetadataResource {
    pub access_mode: String,
    pub plan_type: String,
    pub email_verified: bool,
    pub locale: String,
}

impl From<UserMetadata> for UserMetadataResource {
    fn from(metadata: UserMetadata) -> Self {
        Self {
            access_mode: metadata.access_mode.as_str().to_string(),
            plan_type: metadata.plan_type.as_str().to_string(),
            email_verified: metadata.email_verified,
            locale: metadata.locale,
        }
    }
}

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResource {
    pub name: String,
    pub email: String,
    pub img_url: Option<String>,
    pub admin: bool,
    pub active: bool,
    pub source: String,
    pub metadata: UserMetadataResource,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_access: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResource {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
            img_url: user.img_url,
            admin: user.admin,
            active: user.active,
            source: user.source.as_str().to_string(),
            metadata: UserMetadataResource::from(user.metadata),
            last_access: user.last_access,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Identity carried by the presented access token
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimsResource {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub plan: String,
    pub access_mode: String,
    pub expires_at: i64,
}

impl From<Claims> for ClaimsResource {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            name: claims.name,
            email: claims.email,
            roles: claims.roles,
            plan: claims.plan,
            access_mode: claims.access_mode,
            expires_at: claims.exp,
        }
    }
}

use crate::domain::auth::{Claims, ClientContext, TokenType};
use crate::infrastructure::cookies::{ACCESS_TOKEN_COOKIE, find_cookie};
use crate::infrastructure::state::AppState;
use crate::shared::error::AppError;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use std::convert::Infallible;
use std::net::SocketAddr;

pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// Authenticated user extractor.
/// Reads the access token from the Authorization header (mobile) or the
/// access cookie (web). Refresh tokens are rejected.
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.claims
            .user_id()
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| {
                cookie_header(&parts.headers).and_then(|raw| find_cookie(raw, ACCESS_TOKEN_COOKIE))
            })
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let claims = state
            .token_codec
            .validate_token(&token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::Unauthorized("Invalid token type".to_string()));
        }

        Ok(AuthUser { claims })
    }
}

/// Request metadata recorded on refresh-token rows
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub user_agent: String,
    pub ip_address: String,
    pub device_id: Option<String>,
}

impl ClientInfo {
    /// `device_id` from the body wins over the header
    pub fn context(self, device_id: Option<String>) -> ClientContext {
        ClientContext::new(
            self.user_agent,
            self.ip_address,
            device_id.filter(|d| !d.is_empty()).or(self.device_id),
        )
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        // Forwarding headers are client-controlled; only the peer address is recorded
        let ip_address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "127.0.0.1".to_string());

        Ok(ClientInfo {
            user_agent: header_str(header::USER_AGENT.as_str()).unwrap_or_default(),
            ip_address,
            device_id: header_str(DEVICE_ID_HEADER),
        })
    }
}

pub fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim().to_string()).filter(|t| !t.is_empty())
}

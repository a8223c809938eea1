pub mod auth;
pub mod email_verification;
pub mod health;
pub mod mobile_auth;
pub mod password_recovery;

use crate::application::auth::refresh::RefreshTokenUseCase;
use crate::application::auth::session::SessionIssuer;
use crate::application::verification::issue::EmailVerificationIssuer;
use crate::infrastructure::state::AppState;
use axum::http::{HeaderName, header};
use axum::response::AppendHeaders;
use cookie::Cookie;
use std::sync::Arc;

pub(crate) fn session_issuer(state: &AppState) -> SessionIssuer {
    SessionIssuer::new(
        state.refresh_tokens.clone(),
        state.token_codec.clone(),
        state.cookies.clone(),
    )
}

pub(crate) fn refresh_use_case(state: &AppState) -> RefreshTokenUseCase {
    RefreshTokenUseCase::new(
        state.users.clone(),
        state.refresh_tokens.clone(),
        session_issuer(state),
    )
}

pub(crate) fn verification_issuer(state: &AppState) -> Arc<EmailVerificationIssuer> {
    Arc::new(EmailVerificationIssuer::new(
        state.verification_tokens.clone(),
        state.email_queue.clone(),
        state.frontend_url.clone(),
    ))
}

/// One `Set-Cookie` header per cookie
pub(crate) fn set_cookies(cookies: &[Cookie<'static>]) -> AppendHeaders<Vec<(HeaderName, String)>> {
    AppendHeaders(
        cookies
            .iter()
            .map(|cookie| (header::SET_COOKIE, cookie.to_string()))
            .collect(),
    )
}

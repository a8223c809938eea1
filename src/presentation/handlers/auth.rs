use crate::application::auth::login::{LoginRequest, LoginUseCase};
use crate::application::auth::register::{RegisterUseCase, SignupRequest};
use crate::application::auth::revoke::{RevokeAllRefreshTokensUseCase, RevokeRefreshTokenUseCase};
use crate::infrastructure::cookies::{REFRESH_TOKEN_COOKIE, find_cookie};
use crate::infrastructure::state::AppState;
use crate::presentation::dtos::{AuthTokenResource, ClaimsResource, UserResource};
use crate::presentation::extractors::{AuthUser, ClientInfo, cookie_header};
use crate::presentation::handlers::{
    refresh_use_case, session_issuer, set_cookies, verification_issuer,
};
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::{JsonApiResource, JsonApiResponse, MessageResponse};
use crate::shared::validation::ValidatedJson;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

fn refresh_cookie(headers: &HeaderMap) -> Option<String> {
    cookie_header(headers).and_then(|raw| find_cookie(raw, REFRESH_TOKEN_COOKIE))
}

/// Login with email and password. Session cookies are set on the response.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = JsonApiResponse<JsonApiResource<AuthTokenResource>>),
        (status = 401, description = "Invalid credentials or unusable account", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = LoginUseCase::new(
        state.users.clone(),
        state.password_service.clone(),
        session_issuer(&state),
    );

    let outcome = use_case.execute(req, client.context(None)).await?;
    let resource = JsonApiResource::new(
        "auth-tokens",
        "session",
        AuthTokenResource::from(outcome.response()),
    );

    Ok((
        StatusCode::OK,
        set_cookies(&outcome.session.cookies),
        Json(JsonApiResponse::new(resource)),
    ))
}

/// Rotate the refresh cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed successfully", body = JsonApiResponse<JsonApiResource<AuthTokenResource>>),
        (status = 401, description = "Missing, invalid, used or revoked refresh token", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    client: ClientInfo,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let raw_token = refresh_cookie(&headers).ok_or_else(|| {
        AppError::Unauthorized("Refresh token not found in cookies".to_string())
    })?;

    let session = refresh_use_case(&state)
        .execute(&raw_token, client.context(None))
        .await?;
    let resource = JsonApiResource::new(
        "auth-tokens",
        "session",
        AuthTokenResource::from(session.tokens),
    );

    Ok((
        StatusCode::OK,
        set_cookies(&session.cookies),
        Json(JsonApiResponse::new(resource)),
    ))
}

/// Logout from the current device and clear every cookie the client sent
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let raw_token = refresh_cookie(&headers).unwrap_or_default();

    RevokeRefreshTokenUseCase::new(state.refresh_tokens.clone())
        .execute(&raw_token)
        .await?;

    let cookies = state
        .cookies
        .build_expired_cookies_from_header(cookie_header(&headers));

    Ok((
        StatusCode::OK,
        set_cookies(&cookies),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// Revoke every other session of the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout-all",
    responses(
        (status = 200, description = "Other sessions revoked", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = auth.user_id()?;
    let current = refresh_cookie(&headers);

    RevokeAllRefreshTokensUseCase::new(state.refresh_tokens.clone())
        .execute(user_id, current.as_deref())
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Logged out from all other devices")),
    ))
}

/// Register a local account. It stays inactive until the email is verified.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered", body = JsonApiResponse<JsonApiResource<UserResource>>),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Password policy or validation error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = RegisterUseCase::new(
        state.users.clone(),
        state.password_service.clone(),
        verification_issuer(&state),
    );

    let user = use_case.execute(req).await?;
    let resource = JsonApiResource::new("users", user.id.to_string(), UserResource::from(user));

    Ok((StatusCode::CREATED, Json(JsonApiResponse::new(resource))))
}

/// Identity of the presented access token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current session", body = JsonApiResponse<JsonApiResource<ClaimsResource>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> Result<impl IntoResponse, AppError> {
    let id = auth.claims.id.clone();
    let resource = JsonApiResource::new("users", id, ClaimsResource::from(auth.claims));

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}

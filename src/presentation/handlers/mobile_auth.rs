use crate::application::auth::federated::{
    FederatedLoginUseCase, MobileAuthResult, MobileOAuth2Request, MobileRefreshRequest,
    MobileRefreshResult, RefreshMobileTokenUseCase,
};
use crate::infrastructure::state::AppState;
use crate::presentation::extractors::ClientInfo;
use crate::presentation::handlers::{refresh_use_case, session_issuer};
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::{JsonApiResource, JsonApiResponse};
use crate::shared::validation::ValidatedJson;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Exchange a Google ID token for a session. Tokens are returned in the body.
#[utoipa::path(
    post,
    path = "/api/v1/auth/mobile/oauth2/google",
    request_body = MobileOAuth2Request,
    responses(
        (status = 200, description = "Authenticated", body = JsonApiResponse<JsonApiResource<MobileAuthResult>>),
        (status = 401, description = "Identity token rejected or account unusable", body = ErrorResponse),
        (status = 404, description = "Federated login not configured", body = ErrorResponse)
    ),
    tag = "Mobile Auth"
)]
pub async fn google_login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<MobileOAuth2Request>,
) -> Result<impl IntoResponse, AppError> {
    let verifier = state
        .identity_verifier
        .clone()
        .ok_or_else(|| AppError::NotFound("Google login is not enabled".to_string()))?;

    let use_case =
        FederatedLoginUseCase::new(state.users.clone(), verifier, session_issuer(&state));

    let result = use_case
        .execute(&req.id_token, client.context(req.device_id))
        .await?;
    let resource = JsonApiResource::new("mobile-sessions", result.user_id.to_string(), result);

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}

/// Rotate a refresh token sent in the body
#[utoipa::path(
    post,
    path = "/api/v1/auth/mobile/refresh",
    request_body = MobileRefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = JsonApiResponse<JsonApiResource<MobileRefreshResult>>),
        (status = 401, description = "Invalid, used or revoked refresh token", body = ErrorResponse)
    ),
    tag = "Mobile Auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<MobileRefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = RefreshMobileTokenUseCase::new(refresh_use_case(&state))
        .execute(&req.refresh_token, client.context(None))
        .await?;
    let resource = JsonApiResource::new("auth-tokens", "session", result);

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}

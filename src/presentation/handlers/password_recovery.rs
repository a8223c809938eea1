use crate::application::recovery::request::{
    PasswordRecoveryRequest, RECOVERY_REQUESTED_MESSAGE, RequestPasswordRecoveryUseCase,
};
use crate::application::recovery::reset::{
    ResetPasswordRequest, ResetPasswordUseCase, ResetTokenQuery, ResetTokenStatus,
    VerifyResetTokenUseCase,
};
use crate::infrastructure::state::AppState;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::{JsonApiResource, JsonApiResponse, MessageResponse};
use crate::shared::validation::{ValidatedJson, ValidatedQuery};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Always answers the same way so accounts cannot be enumerated
#[utoipa::path(
    post,
    path = "/api/v1/password-recovery/request",
    request_body = PasswordRecoveryRequest,
    responses(
        (status = 200, description = "Recovery requested", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Password Recovery"
)]
pub async fn request_recovery(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PasswordRecoveryRequest>,
) -> Result<impl IntoResponse, AppError> {
    RequestPasswordRecoveryUseCase::new(
        state.users.clone(),
        state.reset_tokens.clone(),
        state.email_queue.clone(),
        state.frontend_url.clone(),
    )
    .execute(&req.email)
    .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new(RECOVERY_REQUESTED_MESSAGE)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/password-recovery/verify",
    params(ResetTokenQuery),
    responses(
        (status = 200, description = "Token is usable", body = JsonApiResponse<JsonApiResource<ResetTokenStatus>>),
        (status = 404, description = "Invalid or already used token", body = ErrorResponse),
        (status = 422, description = "Token expired", body = ErrorResponse)
    ),
    tag = "Password Recovery"
)]
pub async fn verify_reset_token(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ResetTokenQuery>,
) -> Result<impl IntoResponse, AppError> {
    let token = VerifyResetTokenUseCase::new(state.reset_tokens.clone())
        .execute(&query.token)
        .await?;
    let resource = JsonApiResource::new(
        "password-reset-tokens",
        token.id.to_string(),
        ResetTokenStatus { valid: true },
    );

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}

/// Set a new password. Every session of the account is revoked.
#[utoipa::path(
    post,
    path = "/api/v1/password-recovery/reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 404, description = "Invalid or already used token", body = ErrorResponse),
        (status = 422, description = "Token expired or password policy violated", body = ErrorResponse)
    ),
    tag = "Password Recovery"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    ResetPasswordUseCase::new(
        state.reset_tokens.clone(),
        state.users.clone(),
        state.refresh_tokens.clone(),
        state.password_service.clone(),
    )
    .execute(req)
    .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Password updated successfully")),
    ))
}

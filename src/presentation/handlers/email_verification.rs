use crate::application::verification::resend::{
    ResendVerificationRequest, ResendVerificationUseCase,
};
use crate::application::verification::verify::{
    VerifyEmailQuery, VerifyEmailResponse, VerifyEmailUseCase,
};
use crate::infrastructure::state::AppState;
use crate::presentation::handlers::verification_issuer;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::{JsonApiResource, JsonApiResponse, MessageResponse};
use crate::shared::validation::{ValidatedJson, ValidatedQuery};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Target of the link in the verification email
#[utoipa::path(
    get,
    path = "/api/v1/email-verification/verify",
    params(VerifyEmailQuery),
    responses(
        (status = 200, description = "Email verified", body = JsonApiResponse<JsonApiResource<VerifyEmailResponse>>),
        (status = 404, description = "Unknown token", body = ErrorResponse),
        (status = 422, description = "Token expired or already used", body = ErrorResponse)
    ),
    tag = "Email Verification"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<VerifyEmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = VerifyEmailUseCase::new(state.verification_tokens.clone(), state.users.clone());

    let response = use_case.execute(&query.token).await?;
    let resource = JsonApiResource::new(
        "email-verifications",
        response.user_id.to_string(),
        response,
    );

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}

#[utoipa::path(
    post,
    path = "/api/v1/email-verification/resend",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Verification email queued", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Email already verified", body = ErrorResponse)
    ),
    tag = "Email Verification"
)]
pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResendVerificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    ResendVerificationUseCase::new(state.users.clone(), verification_issuer(&state))
        .execute(&req.email)
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Verification email sent")),
    ))
}

use crate::application::auth::federated::{
    MobileAuthResult, MobileOAuth2Request, MobileRefreshRequest, MobileRefreshResult,
};
use crate::application::auth::login::LoginRequest;
use crate::application::auth::register::SignupRequest;
use crate::application::recovery::request::PasswordRecoveryRequest;
use crate::application::recovery::reset::{ResetPasswordRequest, ResetTokenStatus};
use crate::application::verification::resend::ResendVerificationRequest;
use crate::application::verification::verify::VerifyEmailResponse;
use crate::presentation::dtos::{
    AuthTokenResource, ClaimsResource, UserMetadataResource, UserResource,
};
use crate::shared::error::{ErrorResponse, JsonApiError, JsonApiErrorSource};
use crate::shared::response::{JsonApiMeta, JsonApiResource, JsonApiResponse, MessageResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gatehouse Auth API",
        version = "0.1.0",
        description = "Session management with rotating refresh tokens, email verification and password recovery.\n\nResponses follow the JSON:API v1.1 document structure.",
    ),
    paths(
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh_token,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::auth::logout_all,
        crate::presentation::handlers::auth::signup,
        crate::presentation::handlers::auth::me,
        crate::presentation::handlers::mobile_auth::google_login,
        crate::presentation::handlers::mobile_auth::refresh,
        crate::presentation::handlers::email_verification::verify_email,
        crate::presentation::handlers::email_verification::resend_verification,
        crate::presentation::handlers::password_recovery::request_recovery,
        crate::presentation::handlers::password_recovery::verify_reset_token,
        crate::presentation::handlers::password_recovery::reset_password,
    ),
    components(
        schemas(
            // Request DTOs
            LoginRequest,
            SignupRequest,
            MobileOAuth2Request,
            MobileRefreshRequest,
            ResendVerificationRequest,
            PasswordRecoveryRequest,
            ResetPasswordRequest,

            // JSON:API Resource types
            AuthTokenResource,
            UserResource,
            UserMetadataResource,
            ClaimsResource,
            MobileAuthResult,
            MobileRefreshResult,
            VerifyEmailResponse,
            ResetTokenStatus,
            JsonApiResource<AuthTokenResource>,
            JsonApiResource<UserResource>,

            // JSON:API Response types
            JsonApiResponse<JsonApiResource<AuthTokenResource>>,
            JsonApiResponse<JsonApiResource<UserResource>>,
            JsonApiMeta,
            MessageResponse,

            // JSON:API Error types
            ErrorResponse,
            JsonApiError,
            JsonApiErrorSource,
        )
    ),
    tags(
        (name = "Auth", description = "Login, refresh, logout and signup"),
        (name = "Mobile Auth", description = "Federated login with tokens in the body"),
        (name = "Email Verification", description = "Email address confirmation"),
        (name = "Password Recovery", description = "Password reset by email")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

use crate::common;
use crate::setup_test_db_or_skip;
use gatehouse::application::auth::login::{LoginRequest, LoginUseCase};
use gatehouse::application::auth::register::{RegisterUseCase, SignupRequest};
use gatehouse::application::auth::session::{SessionIssuer, UNVERIFIED_EMAIL_MESSAGE};
use gatehouse::application::recovery::request::RequestPasswordRecoveryUseCase;
use gatehouse::application::recovery::reset::{ResetPasswordRequest, ResetPasswordUseCase};
use gatehouse::application::users::seed_admin::SeedAdminUseCase;
use gatehouse::application::verification::issue::EmailVerificationIssuer;
use gatehouse::application::verification::verify::VerifyEmailUseCase;
use gatehouse::domain::auth::ClientContext;
use gatehouse::infrastructure::state::AppState;
use gatehouse::shared::error::AppError;
use serial_test::serial;
use std::sync::Arc;

fn login(state: &AppState) -> LoginUseCase {
    LoginUseCase::new(
        state.users.clone(),
        state.password_service.clone(),
        SessionIssuer::new(
            state.refresh_tokens.clone(),
            state.token_codec.clone(),
            state.cookies.clone(),
        ),
    )
}

fn credentials(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

async fn register(state: &AppState, email: &str) -> i64 {
    let issuer = Arc::new(EmailVerificationIssuer::new(
        state.verification_tokens.clone(),
        state.email_queue.clone(),
        common::FRONTEND_URL.to_string(),
    ));
    RegisterUseCase::new(state.users.clone(), state.password_service.clone(), issuer)
        .execute(SignupRequest {
            name: "Flow".to_string(),
            email: email.to_string(),
            password: "Strong1!".to_string(),
        })
        .await
        .expect("Signup failed")
        .id
}

#[tokio::test]
#[serial]
async fn test_signup_verify_login() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let state = common::create_test_app_state(pool.clone());

    let user_id = register(&state, "verify@example.com").await;

    match login(&state)
        .execute(credentials("verify@example.com", "Strong1!"), ClientContext::default())
        .await
    {
        Err(AppError::Unauthorized(msg)) => {
            assert!(msg == UNVERIFIED_EMAIL_MESSAGE || msg.contains("inactive"))
        }
        other => panic!("Expected unverified rejection, got {:?}", other.map(|_| ())),
    }

    let token: String =
        sqlx::query_scalar("SELECT token FROM email_verification_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let verified = VerifyEmailUseCase::new(state.verification_tokens.clone(), state.users.clone())
        .execute(&token)
        .await
        .expect("Verification failed");
    assert_eq!(verified.user_id, user_id);

    let outcome = login(&state)
        .execute(credentials("verify@example.com", "Strong1!"), ClientContext::default())
        .await
        .expect("Login after verification failed");
    assert_eq!(outcome.user.id, user_id);
    assert!(outcome.user.active);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_recovery_replaces_password() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let state = common::create_test_app_state(pool.clone());

    SeedAdminUseCase::new(state.users.clone(), state.password_service.clone())
        .execute("root@example.com", "Strong1!")
        .await
        .unwrap()
        .expect("Admin should be created");

    RequestPasswordRecoveryUseCase::new(
        state.users.clone(),
        state.reset_tokens.clone(),
        state.email_queue.clone(),
        common::FRONTEND_URL.to_string(),
    )
    .execute("root@example.com")
    .await
    .unwrap();

    let token: String = sqlx::query_scalar("SELECT token FROM password_reset_tokens")
        .fetch_one(&pool)
        .await
        .unwrap();

    let reset = ResetPasswordUseCase::new(
        state.reset_tokens.clone(),
        state.users.clone(),
        state.refresh_tokens.clone(),
        state.password_service.clone(),
    );
    reset
        .execute(ResetPasswordRequest {
            token: token.clone(),
            password: "Renewed9$".to_string(),
        })
        .await
        .expect("Reset failed");

    assert!(
        login(&state)
            .execute(credentials("root@example.com", "Strong1!"), ClientContext::default())
            .await
            .is_err()
    );
    assert!(
        login(&state)
            .execute(credentials("root@example.com", "Renewed9$"), ClientContext::default())
            .await
            .is_ok()
    );

    let again = reset
        .execute(ResetPasswordRequest {
            token,
            password: "Another7&".to_string(),
        })
        .await;
    assert!(matches!(again, Err(AppError::NotFound(_))));

    // Seeding again leaves the account alone
    let seeded = SeedAdminUseCase::new(state.users.clone(), state.password_service.clone())
        .execute("root@example.com", "Strong1!")
        .await
        .unwrap();
    assert!(seeded.is_none());

    common::cleanup_test_db(&pool).await;
}

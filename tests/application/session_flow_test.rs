use crate::common;
use crate::setup_test_db_or_skip;
use gatehouse::application::auth::login::{LoginRequest, LoginUseCase};
use gatehouse::application::auth::refresh::{
    RefreshTokenUseCase, TOKEN_ALREADY_USED_MESSAGE, TOKEN_REVOKED_MESSAGE,
};
use gatehouse::application::auth::revoke::RevokeAllRefreshTokensUseCase;
use gatehouse::application::auth::session::SessionIssuer;
use gatehouse::application::tokens::hash_token;
use gatehouse::domain::auth::{ClientContext, RefreshTokenRepository};
use gatehouse::domain::password::PasswordHashingService;
use gatehouse::domain::users::{NewUser, User, UserMetadata, UserRepository, UserSource};
use gatehouse::infrastructure::state::AppState;
use gatehouse::shared::error::AppError;
use serial_test::serial;

fn sessions(state: &AppState) -> SessionIssuer {
    SessionIssuer::new(
        state.refresh_tokens.clone(),
        state.token_codec.clone(),
        state.cookies.clone(),
    )
}

fn refresh(state: &AppState) -> RefreshTokenUseCase {
    RefreshTokenUseCase::new(state.users.clone(), state.refresh_tokens.clone(), sessions(state))
}

fn login(state: &AppState) -> LoginUseCase {
    LoginUseCase::new(
        state.users.clone(),
        state.password_service.clone(),
        sessions(state),
    )
}

fn client(device: &str) -> ClientContext {
    ClientContext::new("flow-test", "10.0.0.1", Some(device.to_string()))
}

async fn create_user(state: &AppState, email: &str, password: &str) -> User {
    let hash = state.password_service.hash_password(password).unwrap();
    state
        .users
        .create(NewUser {
            name: "Flow".to_string(),
            email: email.to_string(),
            password_hash: Some(hash),
            img_url: None,
            admin: false,
            active: true,
            source: UserSource::Local,
            metadata: UserMetadata {
                email_verified: true,
                ..UserMetadata::default()
            },
        })
        .await
        .expect("Failed to create user")
}

fn request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
#[serial]
async fn test_login_then_rotate() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let state = common::create_test_app_state(pool.clone());
    let user = create_user(&state, "flow@example.com", "Strong1!").await;

    let outcome = login(&state)
        .execute(request("flow@example.com", "Strong1!"), client("laptop"))
        .await
        .expect("Login failed");
    assert_eq!(outcome.user.id, user.id);
    assert_eq!(outcome.session.tokens.token_type, "Bearer");

    let rotated = refresh(&state)
        .execute(&outcome.session.tokens.refresh_token, client("laptop"))
        .await
        .expect("Refresh failed");
    assert_eq!(rotated.family_id, outcome.session.family_id);

    let old = state
        .refresh_tokens
        .find_by_hash(&hash_token(&outcome.session.tokens.refresh_token))
        .await
        .unwrap()
        .unwrap();
    let new = state
        .refresh_tokens
        .find_by_hash(&hash_token(&rotated.tokens.refresh_token))
        .await
        .unwrap()
        .unwrap();
    assert!(old.used);
    assert!(new.is_live());
    assert_eq!(new.rotated_from, Some(old.id));
    assert_eq!(new.device_id, "laptop");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_replay_revokes_every_device() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let state = common::create_test_app_state(pool.clone());
    create_user(&state, "replay@example.com", "Strong1!").await;

    let laptop = login(&state)
        .execute(request("replay@example.com", "Strong1!"), client("laptop"))
        .await
        .unwrap();
    let phone = login(&state)
        .execute(request("replay@example.com", "Strong1!"), client("phone"))
        .await
        .unwrap();

    refresh(&state)
        .execute(&laptop.session.tokens.refresh_token, client("laptop"))
        .await
        .unwrap();

    match refresh(&state)
        .execute(&laptop.session.tokens.refresh_token, client("attacker"))
        .await
    {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, TOKEN_ALREADY_USED_MESSAGE),
        other => panic!("Expected reuse rejection, got {:?}", other.map(|_| ())),
    }

    match refresh(&state)
        .execute(&phone.session.tokens.refresh_token, client("phone"))
        .await
    {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, TOKEN_REVOKED_MESSAGE),
        other => panic!("Expected revoked, got {:?}", other.map(|_| ())),
    }

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_concurrent_refresh_has_one_winner() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let state = common::create_test_app_state(pool.clone());
    create_user(&state, "race@example.com", "Strong1!").await;

    let outcome = login(&state)
        .execute(request("race@example.com", "Strong1!"), client("laptop"))
        .await
        .unwrap();
    let raw = outcome.session.tokens.refresh_token;

    let a = refresh(&state);
    let b = refresh(&state);
    let (first, second) = tokio::join!(
        a.execute(&raw, client("laptop")),
        b.execute(&raw, client("laptop"))
    );

    assert_eq!(
        [first.is_ok(), second.is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count(),
        1
    );

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_logout_all_spares_current_session() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let state = common::create_test_app_state(pool.clone());
    let user = create_user(&state, "spare@example.com", "Strong1!").await;

    let current = login(&state)
        .execute(request("spare@example.com", "Strong1!"), client("laptop"))
        .await
        .unwrap();
    let other = login(&state)
        .execute(request("spare@example.com", "Strong1!"), client("phone"))
        .await
        .unwrap();

    RevokeAllRefreshTokensUseCase::new(state.refresh_tokens.clone())
        .execute(user.id, Some(&current.session.tokens.refresh_token))
        .await
        .unwrap();

    assert!(
        refresh(&state)
            .execute(&current.session.tokens.refresh_token, client("laptop"))
            .await
            .is_ok()
    );
    assert!(
        refresh(&state)
            .execute(&other.session.tokens.refresh_token, client("phone"))
            .await
            .is_err()
    );

    common::cleanup_test_db(&pool).await;
}

use crate::common;

use gatehouse::domain::auth::{NewRefreshToken, RefreshTokenRepository};
use gatehouse::domain::recovery::{NewPasswordResetToken, PasswordResetTokenRepository};
use gatehouse::domain::users::{
    AccessMode, DuplicateEmail, NewUser, User, UserMetadata, UserRepository, UserSource,
};
use gatehouse::domain::verification::{
    EmailVerificationTokenRepository, NewEmailVerificationToken,
};
use gatehouse::infrastructure::repositories::email_verification_tokens::PostgresEmailVerificationTokenRepository;
use gatehouse::infrastructure::repositories::password_reset_tokens::PostgresPasswordResetTokenRepository;
use gatehouse::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use gatehouse::infrastructure::repositories::users::PostgresUserRepository;
use serial_test::serial;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

async fn create_test_user(pool: &PgPool, email: &str) -> User {
    PostgresUserRepository::new(pool.clone())
        .create(NewUser {
            name: "Repo".to_string(),
            email: email.to_string(),
            password_hash: Some("hashed_password".to_string()),
            img_url: None,
            admin: false,
            active: true,
            source: UserSource::Local,
            metadata: UserMetadata::default(),
        })
        .await
        .expect("Failed to create user")
}

fn new_refresh_token(user: &User, family_id: Uuid, hash: &str) -> NewRefreshToken {
    NewRefreshToken {
        user_id: user.id,
        user_email: user.email.clone(),
        device_id: "device".to_string(),
        user_agent: "agent".to_string(),
        ip_address: "127.0.0.1".to_string(),
        jti: Uuid::new_v4().to_string(),
        family_id,
        token_hash: hash.to_string(),
        expires_at: OffsetDateTime::now_utc() + Duration::days(7),
        rotated_from: None,
    }
}

#[tokio::test]
#[serial]
async fn test_user_repository_round_trips_metadata() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = PostgresUserRepository::new(pool.clone());

    let mut user = create_test_user(&pool, "meta@example.com").await;
    assert_eq!(user.source, UserSource::Local);
    assert!(!user.metadata.email_verified);

    user.metadata.email_verified = true;
    user.metadata.access_mode = AccessMode::ReadOnly;
    user.last_access = Some(OffsetDateTime::now_utc());
    user.source = UserSource::Google;
    repo.update(&user).await.expect("Failed to update user");

    let found = repo
        .find_by_email("meta@example.com")
        .await
        .unwrap()
        .expect("User should exist");
    assert_eq!(found.id, user.id);
    assert!(found.metadata.email_verified);
    assert_eq!(found.metadata.access_mode, AccessMode::ReadOnly);
    assert_eq!(found.source, UserSource::Google);
    assert!(found.last_access.is_some());

    assert!(repo.find_by_id(found.id + 1000).await.unwrap().is_none());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_user_email_is_unique() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    create_test_user(&pool, "dup@example.com").await;
    let result = PostgresUserRepository::new(pool.clone())
        .create(NewUser {
            name: "Other".to_string(),
            email: "dup@example.com".to_string(),
            password_hash: None,
            img_url: None,
            admin: false,
            active: true,
            source: UserSource::Google,
            metadata: UserMetadata::default(),
        })
        .await;

    let err = result.expect_err("Duplicate email should be rejected");
    assert!(err.is::<DuplicateEmail>());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_token_mark_used_only_once() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let user = create_test_user(&pool, "mark@example.com").await;
    let repo = PostgresRefreshTokenRepository::new(pool.clone());

    let created = repo
        .create(new_refresh_token(&user, Uuid::new_v4(), "hash-mark"))
        .await
        .expect("Failed to create token");
    assert!(created.is_live());

    let (first, second) = tokio::join!(repo.mark_used("hash-mark"), repo.mark_used("hash-mark"));
    assert_ne!(first.unwrap(), second.unwrap());

    let stored = repo.find_by_hash("hash-mark").await.unwrap().unwrap();
    assert!(stored.used);
    assert!(stored.used_at.is_some());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_token_revoked_cannot_be_marked() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let user = create_test_user(&pool, "revoked@example.com").await;
    let repo = PostgresRefreshTokenRepository::new(pool.clone());

    repo.create(new_refresh_token(&user, Uuid::new_v4(), "hash-revoked"))
        .await
        .unwrap();

    assert_eq!(repo.revoke_by_hash("hash-revoked").await.unwrap(), 1);
    // Revoking twice keeps the first timestamp
    assert_eq!(repo.revoke_by_hash("hash-revoked").await.unwrap(), 0);
    assert!(!repo.mark_used("hash-revoked").await.unwrap());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_token_revoke_all_except() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let user = create_test_user(&pool, "except@example.com").await;
    let other_user = create_test_user(&pool, "bystander@example.com").await;
    let repo = PostgresRefreshTokenRepository::new(pool.clone());

    for hash in ["keep", "drop-1", "drop-2"] {
        repo.create(new_refresh_token(&user, Uuid::new_v4(), hash))
            .await
            .unwrap();
    }
    repo.create(new_refresh_token(&other_user, Uuid::new_v4(), "bystander"))
        .await
        .unwrap();

    let revoked = repo.revoke_all_for_user_except(user.id, "keep").await.unwrap();
    assert_eq!(revoked, 2);

    assert!(repo.find_by_hash("keep").await.unwrap().unwrap().is_live());
    assert!(
        repo.find_by_hash("drop-1")
            .await
            .unwrap()
            .unwrap()
            .is_revoked()
    );
    assert!(
        repo.find_by_hash("bystander")
            .await
            .unwrap()
            .unwrap()
            .is_live()
    );

    assert_eq!(repo.revoke_all_for_user(user.id).await.unwrap(), 1);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_verification_token_lifecycle() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let user = create_test_user(&pool, "verify@example.com").await;
    let repo = PostgresEmailVerificationTokenRepository::new(pool.clone());

    let new_token = |token: &str| NewEmailVerificationToken {
        user_id: user.id,
        email: user.email.clone(),
        token: token.to_string(),
        expires_at: OffsetDateTime::now_utc() + Duration::hours(24),
    };

    let first = repo.create(new_token("first")).await.unwrap();
    assert!(!first.used);
    assert!(!first.is_expired());

    assert_eq!(repo.invalidate_for_user(user.id).await.unwrap(), 1);
    let second = repo.create(new_token("second")).await.unwrap();

    let stale = repo.find_by_token("first").await.unwrap().unwrap();
    assert!(stale.used);

    assert!(repo.mark_used(second.id).await.unwrap());
    assert!(!repo.mark_used(second.id).await.unwrap());
    let used = repo.find_by_token("second").await.unwrap().unwrap();
    assert!(used.verified_at.is_some());

    assert!(repo.find_by_token("missing").await.unwrap().is_none());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_reset_token_lifecycle() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let user = create_test_user(&pool, "reset@example.com").await;
    let repo = PostgresPasswordResetTokenRepository::new(pool.clone());

    let created = repo
        .create(NewPasswordResetToken {
            user_id: user.id,
            email: user.email.clone(),
            token: "reset-token".to_string(),
            expires_at: OffsetDateTime::now_utc() + Duration::hours(1),
        })
        .await
        .unwrap();

    let found = repo.find_unused("reset-token").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);

    assert!(repo.mark_used(created.id).await.unwrap());
    assert!(!repo.mark_used(created.id).await.unwrap());
    assert!(repo.find_unused("reset-token").await.unwrap().is_none());

    common::cleanup_test_db(&pool).await;
}

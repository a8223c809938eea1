use crate::domain::verification::{
    EmailVerificationToken, EmailVerificationTokenRepository, NewEmailVerificationToken,
};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::verification::EmailVerificationTokenDbModel;
use anyhow::Result;
use async_trait::async_trait;

pub struct PostgresEmailVerificationTokenRepository {
    pool: DbPool,
}

impl PostgresEmailVerificationTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailVerificationTokenRepository for PostgresEmailVerificationTokenRepository {
    async fn create(&self, token: NewEmailVerificationToken) -> Result<EmailVerificationToken> {
        let token_db = sqlx::query_as::<_, EmailVerificationTokenDbModel>(
            r#"
            INSERT INTO email_verification_tokens (user_id, email, token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, email, token, expires_at, verified_at, used, created_at
            "#,
        )
        .bind(token.user_id)
        .bind(&token.email)
        .bind(&token.token)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token_db.into())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<EmailVerificationToken>> {
        let token_db = sqlx::query_as::<_, EmailVerificationTokenDbModel>(
            r#"
            SELECT id, user_id, email, token, expires_at, verified_at, used, created_at
            FROM email_verification_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token_db.map(Into::into))
    }

    async fn invalidate_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE email_verification_tokens
            SET used = TRUE
            WHERE user_id = $1 AND used = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_used(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE email_verification_tokens
            SET used = TRUE, verified_at = NOW()
            WHERE id = $1 AND used = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

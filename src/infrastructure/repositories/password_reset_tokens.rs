use crate::domain::recovery::{
    NewPasswordResetToken, PasswordResetToken, PasswordResetTokenRepository,
};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::recovery::PasswordResetTokenDbModel;
use anyhow::Result;
use async_trait::async_trait;

pub struct PostgresPasswordResetTokenRepository {
    pool: DbPool,
}

impl PostgresPasswordResetTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetTokenRepository for PostgresPasswordResetTokenRepository {
    async fn create(&self, token: NewPasswordResetToken) -> Result<PasswordResetToken> {
        let token_db = sqlx::query_as::<_, PasswordResetTokenDbModel>(
            r#"
            INSERT INTO password_reset_tokens (user_id, email, token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, email, token, expires_at, used, used_at, created_at
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

    async fn find_unused(&self, token: &str) -> Result<Option<PasswordResetToken>> {
        let token_db = sqlx::query_as::<_, PasswordResetTokenDbModel>(
            r#"
            SELECT id, user_id, email, token, expires_at, used, used_at, created_at
            FROM password_reset_tokens
            WHERE token = $1 AND used = FALSE
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
            UPDATE password_reset_tokens
            SET used = TRUE, used_at = NOW()
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
            UPDATE password_reset_tokens
            SET used = TRUE, used_at = NOW()
            WHERE id = $1 AND used = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

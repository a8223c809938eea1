use crate::domain::auth::{NewRefreshToken, RefreshToken, RefreshTokenRepository};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::auth::RefreshTokenDbModel;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, user_email, device_id, user_agent, ip_address, jti, family_id, \
                       token_hash, expires_at, created_at, used, used_at, rotated_from, revoked_at";

pub struct PostgresRefreshTokenRepository {
    pool: DbPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let query = format!(
            r#"
            INSERT INTO refresh_tokens
                (id, user_id, user_email, device_id, user_agent, ip_address, jti, family_id,
                 token_hash, expires_at, rotated_from)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        );

        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(&query)
            .bind(Uuid::new_v4())
            .bind(token.user_id)
            .bind(&token.user_email)
            .bind(&token.device_id)
            .bind(&token.user_agent)
            .bind(&token.ip_address)
            .bind(&token.jti)
            .bind(token.family_id)
            .bind(&token.token_hash)
            .bind(token.expires_at)
            .bind(token.rotated_from)
            .fetch_one(&self.pool)
            .await?;

        Ok(token_db.into())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let query = format!("SELECT {COLUMNS} FROM refresh_tokens WHERE token_hash = $1");

        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(token_db.map(Into::into))
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE token_hash = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn revoke_all_for_user_except(&self, user_id: i64, except_hash: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE user_id = $1 AND token_hash <> $2 AND revoked_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(except_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_used(&self, token_hash: &str) -> Result<bool> {
        // Single conditional UPDATE: of two concurrent redemptions only one
        // can match `used = FALSE`, the other sees zero affected rows.
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET used = TRUE, used_at = NOW()
            WHERE token_hash = $1 AND used = FALSE AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

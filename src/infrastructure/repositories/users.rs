use crate::domain::users::{DuplicateEmail, NewUser, User, UserRepository};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::users::UserDbModel;
use async_trait::async_trait;
use sqlx::types::Json;

const COLUMNS: &str = "id, name, email, password_hash, img_url, admin, active, source, metadata, \
                       last_access, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: DbPool,
}

impl PostgresUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error> {
        let query = format!(
            r#"
            INSERT INTO users (name, email, password_hash, img_url, admin, active, source, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        );

        let email = new_user.email.clone();
        let user = sqlx::query_as::<_, UserDbModel>(&query)
            .bind(new_user.name)
            .bind(new_user.email)
            .bind(new_user.password_hash)
            .bind(new_user.img_url)
            .bind(new_user.admin)
            .bind(new_user.active)
            .bind(new_user.source.as_str())
            .bind(Json(new_user.metadata))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    anyhow::Error::new(DuplicateEmail(email))
                }
                other => other.into(),
            })?;

        user.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, UserDbModel>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        user.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");

        let user = sqlx::query_as::<_, UserDbModel>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        user.map(User::try_from).transpose()
    }

    async fn update(&self, user: &User) -> Result<User, anyhow::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, img_url = $5, admin = $6,
                active = $7, source = $8, metadata = $9, last_access = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, UserDbModel>(&query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.img_url)
            .bind(user.admin)
            .bind(user.active)
            .bind(user.source.as_str())
            .bind(Json(&user.metadata))
            .bind(user.last_access)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {} not found", user.id))?;

        updated.try_into()
    }
}

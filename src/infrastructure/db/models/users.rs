use crate::domain::users::{User, UserMetadata, UserSource};
use sqlx::FromRow;
use sqlx::types::Json;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct UserDbModel {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub img_url: Option<String>,
    pub admin: bool,
    pub active: bool,
    pub source: String,
    pub metadata: Json<UserMetadata>,
    pub last_access: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserDbModel> for User {
    type Error = anyhow::Error;

    fn try_from(model: UserDbModel) -> Result<Self, Self::Error> {
        let source = UserSource::parse(&model.source)
            .ok_or_else(|| anyhow::anyhow!("Unknown user source: {}", model.source))?;

        Ok(Self {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            img_url: model.img_url,
            admin: model.admin,
            active: model.active,
            source,
            metadata: model.metadata.0,
            last_access: model.last_access,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

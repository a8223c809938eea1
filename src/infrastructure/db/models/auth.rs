use crate::domain::auth::RefreshToken;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenDbModel {
    pub id: Uuid,
    pub user_id: i64,
    pub user_email: String,
    pub device_id: String,
    pub user_agent: String,
    pub ip_address: String,
    pub jti: String,
    pub family_id: Uuid,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub used: bool,
    pub used_at: Option<OffsetDateTime>,
    pub rotated_from: Option<Uuid>,
    pub revoked_at: Option<OffsetDateTime>,
}

impl From<RefreshTokenDbModel> for RefreshToken {
    fn from(model: RefreshTokenDbModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            user_email: model.user_email,
            device_id: model.device_id,
            user_agent: model.user_agent,
            ip_address: model.ip_address,
            jti: model.jti,
            family_id: model.family_id,
            token_hash: model.token_hash,
            expires_at: model.expires_at,
            created_at: model.created_at,
            used: model.used,
            used_at: model.used_at,
            rotated_from: model.rotated_from,
            revoked_at: model.revoked_at,
        }
    }
}

use crate::domain::recovery::PasswordResetToken;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetTokenDbModel {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub used: bool,
    pub used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl From<PasswordResetTokenDbModel> for PasswordResetToken {
    fn from(model: PasswordResetTokenDbModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            email: model.email,
            token: model.token,
            expires_at: model.expires_at,
            used: model.used,
            used_at: model.used_at,
            created_at: model.created_at,
        }
    }
}

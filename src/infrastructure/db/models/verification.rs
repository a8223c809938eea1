use crate::domain::verification::EmailVerificationToken;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct EmailVerificationTokenDbModel {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub verified_at: Option<OffsetDateTime>,
    pub used: bool,
    pub created_at: OffsetDateTime,
}

impl From<EmailVerificationTokenDbModel> for EmailVerificationToken {
    fn from(model: EmailVerificationTokenDbModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            email: model.email,
            token: model.token,
            expires_at: model.expires_at,
            verified_at: model.verified_at,
            used: model.used,
            created_at: model.created_at,
        }
    }
}

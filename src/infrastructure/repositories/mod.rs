pub mod email_verification_tokens;
pub mod mock;
pub mod password_reset_tokens;
pub mod refresh_tokens;
pub mod users;

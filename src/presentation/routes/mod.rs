pub mod auth;
pub mod email_verification;
pub mod password_recovery;

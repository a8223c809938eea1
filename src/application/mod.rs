pub mod auth;
pub mod recovery;
pub mod tokens;
pub mod users;
pub mod verification;

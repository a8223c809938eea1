pub mod auth;
pub mod email;
pub mod identity;
pub mod password;
pub mod recovery;
pub mod users;
pub mod verification;

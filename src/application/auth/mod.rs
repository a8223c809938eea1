pub mod federated;
pub mod login;
pub mod refresh;
pub mod register;
pub mod revoke;
pub mod session;

pub mod auth;
pub mod config;
pub mod cookies;
pub mod db;
pub mod email;
pub mod identity;
pub mod password;
pub mod repositories;
pub mod state;

#[path = "../common/mod.rs"]
#[macro_use]
pub mod common;

pub mod account_flow_test;
pub mod session_flow_test;

pub mod request;
pub mod reset;
